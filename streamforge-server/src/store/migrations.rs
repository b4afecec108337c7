//! Embedded migration scripts, applied in array order by [`super::Store`].

pub struct Migration {
    pub filename: &'static str,
    pub sql: &'static str,
}

pub const MIGRATIONS: &[Migration] = &[
    Migration {
        filename: "0001_init.sql",
        sql: include_str!("../../migrations/0001_init.sql"),
    },
    Migration {
        filename: "0002_builtin_templates.sql",
        sql: include_str!("../../migrations/0002_builtin_templates.sql"),
    },
];
