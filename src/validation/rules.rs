//! Catalog validation rules using Validation.
//!
//! Every rule reports through `Validation` so that a single pass collects
//! ALL violations of a catalog instead of stopping at the first one.

use crate::core::{event_name, Catalog, Next, Scope, StateDescriptor, StateRef};
use crate::engine::TriggerSet;
use crate::validation::violations::{ConfigError, EdgeKind, MAX_DEPTH};
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Outcome of one rule.
pub type Check = Validation<(), NonEmptyVec<ConfigError>>;

/// Validate a whole catalog tree against the engine's named triggers.
///
/// Returns `Validation::Success(())` when the catalog can be wired, or
/// `Validation::Failure` carrying every violation in catalog order.
pub fn validate(catalog: &Catalog, triggers: &TriggerSet) -> Check {
    let mut checks = Vec::new();
    check_level(catalog, None, triggers, 0, &mut checks);
    all(checks)
}

fn all(checks: Vec<Check>) -> Check {
    if checks.is_empty() {
        return Validation::success(());
    }
    Validation::all_vec(checks).map(|_| ())
}

fn check_level(
    level: &Catalog,
    enclosing: Option<&Catalog>,
    triggers: &TriggerSet,
    depth: usize,
    checks: &mut Vec<Check>,
) {
    checks.push(check_initial(level));
    checks.push(check_unique_names(level));

    let scope = Scope::new(level, enclosing);
    for state in level.states() {
        let me = StateRef::new(level.id().clone(), state.name());

        if depth > MAX_DEPTH {
            checks.push(Validation::fail(ConfigError::MalformedHierarchy {
                state: me,
                depth,
                limit: MAX_DEPTH,
            }));
            return;
        }

        checks.push(check_final(state, &me));
        checks.push(check_next_targets(&scope, state, &me));
        checks.push(check_prev_override(&scope, state, &me));
        checks.push(check_optional_targets(&scope, state, &me, triggers));

        if let Some(sub) = state.sub_catalog() {
            check_level(sub, Some(level), triggers, depth + 1, checks);
        }
    }
}

fn check_initial(level: &Catalog) -> Check {
    let initial: Vec<String> = level
        .states()
        .iter()
        .filter(|state| state.is_initial())
        .map(|state| state.name().to_string())
        .collect();

    match initial.len() {
        1 => Validation::success(()),
        0 => Validation::fail(ConfigError::MissingInitialState {
            catalog: level.id().clone(),
        }),
        _ => Validation::fail(ConfigError::MultipleInitialStates {
            catalog: level.id().clone(),
            states: initial,
        }),
    }
}

fn check_unique_names(level: &Catalog) -> Check {
    let states = level.states();
    let checks = states
        .iter()
        .enumerate()
        .filter(|(i, state)| states[..*i].iter().any(|s| s.name() == state.name()))
        .map(|(_, state)| {
            Validation::fail(ConfigError::DuplicateState {
                catalog: level.id().clone(),
                name: state.name().to_string(),
            })
        })
        .collect();
    all(checks)
}

fn check_final(state: &StateDescriptor, me: &StateRef) -> Check {
    if state.is_final() && state.transitions().is_some() {
        Validation::fail(ConfigError::FinalWithTransitions { state: me.clone() })
    } else {
        Validation::success(())
    }
}

fn check_next_targets(scope: &Scope<'_>, state: &StateDescriptor, me: &StateRef) -> Check {
    let Some(next) = state.transitions().and_then(|t| t.next()) else {
        return Validation::success(());
    };
    let kind = match next {
        Next::Single(_) => EdgeKind::Next,
        Next::Options(_) => EdgeKind::Option,
    };

    let checks = next
        .targets()
        .into_iter()
        .map(|target| match scope.resolve(target) {
            Some(_) => Validation::success(()),
            None => Validation::fail(ConfigError::UnresolvedTarget {
                state: me.clone(),
                target: target.to_string(),
                kind,
            }),
        })
        .collect();
    all(checks)
}

fn check_prev_override(scope: &Scope<'_>, state: &StateDescriptor, me: &StateRef) -> Check {
    let Some(target) = state.prev_override() else {
        return Validation::success(());
    };

    if scope.resolve_sibling(target).is_some() {
        Validation::success(())
    } else if scope.resolve(target).is_some() {
        Validation::fail(ConfigError::PrevOverrideOutOfScope {
            state: me.clone(),
            target: target.to_string(),
        })
    } else {
        Validation::fail(ConfigError::UnresolvedTarget {
            state: me.clone(),
            target: target.to_string(),
            kind: EdgeKind::PrevOverride,
        })
    }
}

fn check_optional_targets(
    scope: &Scope<'_>,
    state: &StateDescriptor,
    me: &StateRef,
    triggers: &TriggerSet,
) -> Check {
    let next_targets = state.next_targets();
    let mut checks = Vec::new();

    for target in state.optional_targets() {
        if scope.resolve(target).is_none() {
            checks.push(Validation::fail(ConfigError::UnresolvedTarget {
                state: me.clone(),
                target: target.clone(),
                kind: EdgeKind::Optional,
            }));
        }

        let event = event_name(target);
        if !triggers.contains(&event) {
            checks.push(Validation::fail(ConfigError::MissingTrigger {
                state: me.clone(),
                target: target.clone(),
                event,
            }));
        }

        if next_targets.contains(&target.as_str()) {
            checks.push(Validation::fail(ConfigError::OptionalDuplicatesNext {
                state: me.clone(),
                target: target.clone(),
            }));
        }
    }
    all(checks)
}
