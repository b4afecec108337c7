//! The deterministic `resolve(event_type, facts) -> AlertSpec | None`
//! function (spec.md §4.3). Pure and synchronous: callers are responsible
//! for fetching the candidate Alerts (with their enabled Variations) from
//! the Config Repository before calling [`resolve`].

use uuid::Uuid;

use crate::instance::{AlertSpec, AlertWithVariations, TriggerFacts};
use crate::variation::{ConditionType, Variation};

/// The outcome of a successful resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAlert {
    pub spec: AlertSpec,
    pub source_alert_id: Uuid,
}

/// Resolves `facts` against `candidates` (spec.md §4.3 algorithm).
///
/// `candidates` should already be filtered to enabled Alerts of the
/// requested event type; this function sorts defensively by `created_at`
/// ascending so the result is deterministic even if the caller's ordering
/// is not guaranteed.
pub fn resolve(candidates: &[AlertWithVariations], facts: &TriggerFacts) -> Option<ResolvedAlert> {
    let mut ordered: Vec<&AlertWithVariations> = candidates.iter().collect();
    ordered.sort_by_key(|c| c.alert.created_at);

    for candidate in ordered {
        let alert = &candidate.alert;

        // Step 2a: min_amount gate. A set gate with a present fact amount
        // below it skips this candidate entirely — its variations are
        // never evaluated, and resolution does NOT fall through to the
        // next candidate's variations; it simply tries the next candidate.
        if let Some(min_amount) = alert.min_amount {
            if let Some(amount) = facts.amount {
                if amount < min_amount {
                    continue;
                }
            }
        }

        // Step 2b/2c: enabled variations, priority desc, created_at asc tie-break.
        let mut variations: Vec<&Variation> =
            candidate.variations.iter().filter(|v| v.enabled).collect();
        variations.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| a.created_at.cmp(&b.created_at))
        });

        if let Some(matched) = variations.into_iter().find(|v| condition_matches(v, facts)) {
            return Some(ResolvedAlert {
                spec: merge(alert, Some(matched)),
                source_alert_id: alert.id,
            });
        }

        // Step 2d: first-candidate-wins — no variation matched, but this
        // candidate passed its gate, so it is the answer regardless of
        // later candidates of the same type.
        return Some(ResolvedAlert {
            spec: merge(alert, None),
            source_alert_id: alert.id,
        });
    }

    None
}

/// Exactly the three condition kinds defined by spec.md §4.3. Any other
/// kind never matches (there are no other `ConditionType` variants today,
/// but the match is written defensively for forward extension).
fn condition_matches(variation: &Variation, facts: &TriggerFacts) -> bool {
    match variation.condition_type {
        ConditionType::Tier => facts
            .tier
            .as_deref()
            .map(|tier| tier == variation.condition_value)
            .unwrap_or(false),
        ConditionType::Amount => {
            let threshold: f64 = match variation.condition_value.parse() {
                Ok(v) => v,
                Err(_) => return false,
            };
            facts.amount.map(|amount| amount >= threshold).unwrap_or(false)
        }
        ConditionType::Custom => facts
            .custom_value
            .as_deref()
            .map(|v| v == variation.condition_value)
            .unwrap_or(false),
    }
}

/// Merges `variation` (if any) onto a copy of `alert`'s display fields.
/// Neither input is mutated. Only `message_template`, `sound_path`,
/// `sound_volume`, `image_path`, `animation_in`, `animation_out`, and
/// `custom_css` are eligible for override (spec.md §9: "keeping the list
/// explicit is part of the contract"); every other display field always
/// comes from the parent.
fn merge(alert: &crate::alert::Alert, variation: Option<&Variation>) -> AlertSpec {
    let mut spec = AlertSpec::from_alert(alert);

    let Some(variation) = variation else {
        return spec;
    };

    if let Some(v) = &variation.message_template {
        spec.message_template = v.clone();
    }
    if let Some(v) = &variation.sound_path {
        spec.sound_path = Some(v.clone());
    }
    if let Some(v) = variation.sound_volume {
        spec.sound_volume = v;
    }
    if let Some(v) = &variation.image_path {
        spec.image_path = Some(v.clone());
    }
    if let Some(v) = &variation.animation_in {
        spec.animation_in = v.clone();
    }
    if let Some(v) = &variation.animation_out {
        spec.animation_out = v.clone();
    }
    if let Some(v) = &variation.custom_css {
        spec.custom_css = Some(v.clone());
    }

    spec.variation_id = Some(variation.id);
    spec.variation_name = Some(variation.name.clone());
    spec
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::{Alert, NewAlert};
    use crate::event_type::EventType;
    use crate::variation::NewVariation;
    use chrono::{Duration, Utc};
    use proptest::prelude::*;

    fn make_alert(event_type: EventType, min_amount: Option<f64>, offset_secs: i64) -> Alert {
        let now = Utc::now() + Duration::seconds(offset_secs);
        let new = NewAlert {
            event_type,
            min_amount,
            ..Default::default()
        };
        new.into_alert(Uuid::new_v4(), now)
    }

    fn make_variation(
        parent: &Alert,
        condition_type: ConditionType,
        condition_value: &str,
        priority: i32,
        offset_secs: i64,
    ) -> Variation {
        let now = Utc::now() + Duration::seconds(offset_secs);
        NewVariation {
            parent_alert_id: parent.id,
            name: format!("{condition_type}-{condition_value}"),
            condition_type,
            condition_value: condition_value.to_string(),
            priority: Some(priority),
            enabled: Some(true),
            message_template: Some(format!("override-{condition_value}")),
            sound_path: None,
            sound_volume: None,
            image_path: None,
            animation_in: None,
            animation_out: None,
            custom_css: None,
        }
        .into_variation(Uuid::new_v4(), now)
    }

    #[test]
    fn no_candidates_returns_none() {
        let facts = TriggerFacts {
            event_type: Some(EventType::Follow),
            username: Some("alice".into()),
            ..Default::default()
        };
        assert!(resolve(&[], &facts).is_none());
    }

    #[test]
    fn parent_wins_when_no_variation_matches() {
        let alert = make_alert(EventType::Follow, None, 0);
        let candidates = vec![AlertWithVariations {
            alert: alert.clone(),
            variations: vec![],
        }];
        let facts = TriggerFacts {
            event_type: Some(EventType::Follow),
            username: Some("alice".into()),
            ..Default::default()
        };
        let resolved = resolve(&candidates, &facts).expect("should resolve");
        assert_eq!(resolved.source_alert_id, alert.id);
        assert_eq!(resolved.spec.message_template, alert.message_template);
        assert!(resolved.spec.variation_id.is_none());
    }

    #[test]
    fn min_amount_gate_skips_candidate_without_falling_through_to_its_variations() {
        let alert = make_alert(EventType::Cheer, Some(500.0), 0);
        let variation = make_variation(&alert, ConditionType::Amount, "100", 10, 0);
        let candidates = vec![AlertWithVariations {
            alert,
            variations: vec![variation],
        }];
        let facts = TriggerFacts {
            event_type: Some(EventType::Cheer),
            username: Some("carol".into()),
            amount: Some(200.0),
            ..Default::default()
        };
        assert!(resolve(&candidates, &facts).is_none());
    }

    #[test]
    fn tier_variation_matches_and_merges_message_template() {
        let alert = make_alert(EventType::Subscribe, None, 0);
        let variation = make_variation(&alert, ConditionType::Tier, "3", 10, 1);
        let candidates = vec![AlertWithVariations {
            alert,
            variations: vec![variation.clone()],
        }];
        let facts = TriggerFacts {
            event_type: Some(EventType::Subscribe),
            username: Some("bob".into()),
            tier: Some("3".into()),
            ..Default::default()
        };
        let resolved = resolve(&candidates, &facts).expect("should resolve");
        assert_eq!(resolved.spec.message_template, "override-3");
        assert_eq!(resolved.spec.variation_id, Some(variation.id));
    }

    #[test]
    fn priority_desc_then_created_at_asc_tie_break() {
        let alert = make_alert(EventType::Cheer, None, 0);
        let low_priority_first = make_variation(&alert, ConditionType::Amount, "10", 5, 0);
        let high_priority_second = make_variation(&alert, ConditionType::Amount, "10", 20, 1);
        let candidates = vec![AlertWithVariations {
            alert,
            variations: vec![low_priority_first, high_priority_second.clone()],
        }];
        let facts = TriggerFacts {
            event_type: Some(EventType::Cheer),
            amount: Some(50.0),
            ..Default::default()
        };
        let resolved = resolve(&candidates, &facts).unwrap();
        assert_eq!(resolved.spec.variation_id, Some(high_priority_second.id));
    }

    #[test]
    fn tie_broken_by_created_at_ascending() {
        let alert = make_alert(EventType::Cheer, None, 0);
        let earlier = make_variation(&alert, ConditionType::Amount, "10", 10, 0);
        let later = make_variation(&alert, ConditionType::Amount, "10", 10, 5);
        let candidates = vec![AlertWithVariations {
            alert,
            variations: vec![later, earlier.clone()],
        }];
        let facts = TriggerFacts {
            event_type: Some(EventType::Cheer),
            amount: Some(50.0),
            ..Default::default()
        };
        let resolved = resolve(&candidates, &facts).unwrap();
        assert_eq!(resolved.spec.variation_id, Some(earlier.id));
    }

    #[test]
    fn first_candidate_wins_even_if_a_later_one_would_have_matched_better() {
        let first = make_alert(EventType::Follow, None, 0);
        let second = make_alert(EventType::Follow, None, 10);
        let candidates = vec![
            AlertWithVariations {
                alert: first.clone(),
                variations: vec![],
            },
            AlertWithVariations {
                alert: second,
                variations: vec![],
            },
        ];
        let facts = TriggerFacts {
            event_type: Some(EventType::Follow),
            username: Some("dave".into()),
            ..Default::default()
        };
        let resolved = resolve(&candidates, &facts).unwrap();
        assert_eq!(resolved.source_alert_id, first.id);
    }

    #[test]
    fn custom_condition_matches_custom_value_only() {
        let alert = make_alert(EventType::Custom, None, 0);
        let variation = make_variation(&alert, ConditionType::Custom, "raid-train", 1, 0);
        let candidates = vec![AlertWithVariations {
            alert,
            variations: vec![variation.clone()],
        }];
        let facts = TriggerFacts {
            event_type: Some(EventType::Custom),
            custom_value: Some("raid-train".into()),
            ..Default::default()
        };
        let resolved = resolve(&candidates, &facts).unwrap();
        assert_eq!(resolved.spec.variation_id, Some(variation.id));
    }

    #[test]
    fn merge_does_not_mutate_inputs() {
        let alert = make_alert(EventType::Subscribe, None, 0);
        let variation = make_variation(&alert, ConditionType::Tier, "3", 10, 1);
        let alert_before = alert.clone();
        let variation_before = variation.clone();
        let _ = merge(&alert, Some(&variation));
        assert_eq!(alert, alert_before);
        assert_eq!(variation, variation_before);
    }

    #[test]
    fn merge_never_touches_fields_outside_the_documented_set() {
        // spec.md §9: a variation may only ever change message_template,
        // sound_path, sound_volume, image_path, animation_in, animation_out,
        // and custom_css. Everything else always comes from the parent
        // Alert, even when the variation carries its own values for them.
        let alert = make_alert(EventType::Cheer, None, 0);
        let variation = make_variation(&alert, ConditionType::Tier, "gold", 0, 0);

        let spec = merge(&alert, Some(&variation));

        assert_eq!(spec.duration_ms, alert.duration_ms);
        assert_eq!(spec.font_family, alert.font_family);
        assert_eq!(spec.font_size, alert.font_size);
        assert_eq!(spec.text_color, alert.text_color);
        assert_eq!(spec.background_color, alert.background_color);
        assert_eq!(spec.tts_enabled, alert.tts_enabled);
        assert_eq!(spec.message_template, variation.message_template.unwrap());
    }

    proptest::proptest! {
        /// Determinism given a fixed snapshot (spec.md §8 property 6):
        /// resolving the same candidates/facts twice always agrees.
        #[test]
        fn resolve_is_deterministic_for_any_amount(amount in 0.0f64..10_000.0) {
            let alert = make_alert(EventType::Cheer, Some(100.0), 0);
            let variation = make_variation(&alert, ConditionType::Amount, "500", 1, 1);
            let candidates = vec![AlertWithVariations {
                alert,
                variations: vec![variation],
            }];
            let facts = TriggerFacts {
                event_type: Some(EventType::Cheer),
                amount: Some(amount),
                ..Default::default()
            };

            let first = resolve(&candidates, &facts);
            let second = resolve(&candidates, &facts);
            prop_assert_eq!(first, second);
        }

        /// min_amount gating is strict (spec.md §8 property 7): whenever the
        /// fact amount is below the gate, the candidate (and therefore its
        /// variation) is never selected.
        #[test]
        fn min_amount_gate_is_strict(amount in 0.0f64..100.0) {
            let alert = make_alert(EventType::Cheer, Some(500.0), 0);
            let variation = make_variation(&alert, ConditionType::Amount, "1", 1, 1);
            let candidates = vec![AlertWithVariations {
                alert,
                variations: vec![variation],
            }];
            let facts = TriggerFacts {
                event_type: Some(EventType::Cheer),
                amount: Some(amount),
                ..Default::default()
            };

            prop_assert!(resolve(&candidates, &facts).is_none());
        }
    }
}
