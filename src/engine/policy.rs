//! Backend selection policy.
//!
//! A pure function of the session's requirements, evaluated in strict
//! priority order: explicit user override, offline-first, language-support
//! gap, privacy, then performance preference. Deterministic for identical
//! inputs except the documented `Balanced` coin flip, which comes from an
//! injected seedable source so tests can pin it.

use crate::backend::BackendId;
use crate::config::PerformancePreference;
use crate::error::{RecognitionError, Result};
use crate::language;

/// Inputs the policy may consider. Availability comes from each backend's
/// `is_supported()` at decision time.
#[derive(Debug, Clone)]
pub struct SelectionContext<'a> {
    pub explicit: Option<BackendId>,
    pub offline_first: bool,
    pub privacy_mode: bool,
    pub preference: PerformancePreference,
    pub language: &'a str,
    pub native_available: bool,
    pub neural_available: bool,
}

/// Injected randomness for the `Balanced` tie-break.
pub trait TieBreak {
    fn flip(&mut self) -> bool;
}

/// Default tie-break: a seedable xorshift coin. Unweighted 50/50, as the
/// policy has always been; the seam exists so that choice can be revisited
/// in one place.
#[derive(Debug, Clone)]
pub struct SeededCoin {
    state: u64,
}

impl SeededCoin {
    pub fn new(seed: u64) -> Self {
        Self {
            state: seed.max(1),
        }
    }
}

impl Default for SeededCoin {
    fn default() -> Self {
        Self::new(0x9e37_79b9_7f4a_7c15)
    }
}

impl TieBreak for SeededCoin {
    fn flip(&mut self) -> bool {
        // xorshift64
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x & 1 == 1
    }
}

/// Pick the backend for `ctx`, or fail when no backend can serve it.
pub fn select_backend(ctx: &SelectionContext<'_>, coin: &mut dyn TieBreak) -> Result<BackendId> {
    if !ctx.native_available && !ctx.neural_available {
        return Err(RecognitionError::NotSupported);
    }
    if language::find(ctx.language).is_none() {
        return Err(RecognitionError::LanguageNotSupported(
            ctx.language.to_string(),
        ));
    }

    // Highest priority: the user said so.
    if let Some(choice) = ctx.explicit {
        return Ok(choice);
    }

    if ctx.offline_first && ctx.neural_available {
        return Ok(BackendId::Neural);
    }

    // Language gap: a backend that cannot serve the language is off the
    // table regardless of preference.
    let native_fits = ctx.native_available && language::supports(BackendId::Native, ctx.language);
    if !native_fits {
        return if ctx.neural_available {
            Ok(BackendId::Neural)
        } else {
            Err(RecognitionError::LanguageNotSupported(
                ctx.language.to_string(),
            ))
        };
    }

    if ctx.privacy_mode && ctx.neural_available {
        return Ok(BackendId::Neural);
    }

    let neural_fits = ctx.neural_available;
    Ok(match ctx.preference {
        PerformancePreference::Speed => BackendId::Native,
        PerformancePreference::Accuracy => {
            if neural_fits {
                BackendId::Neural
            } else {
                BackendId::Native
            }
        }
        PerformancePreference::ResourceSaving => {
            if neural_fits {
                BackendId::Neural
            } else {
                BackendId::Native
            }
        }
        PerformancePreference::Balanced => {
            if neural_fits {
                if coin.flip() {
                    BackendId::Native
                } else {
                    BackendId::Neural
                }
            } else {
                BackendId::Native
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(language: &str) -> SelectionContext<'_> {
        SelectionContext {
            explicit: None,
            offline_first: false,
            privacy_mode: false,
            preference: PerformancePreference::Speed,
            language,
            native_available: true,
            neural_available: true,
        }
    }

    struct FixedCoin(bool);
    impl TieBreak for FixedCoin {
        fn flip(&mut self) -> bool {
            self.0
        }
    }

    #[test]
    fn explicit_override_beats_everything() {
        let mut context = ctx("en-US");
        context.explicit = Some(BackendId::Neural);
        context.preference = PerformancePreference::Speed;
        let choice = select_backend(&context, &mut FixedCoin(true)).expect("select");
        assert_eq!(choice, BackendId::Neural);
    }

    #[test]
    fn offline_first_forces_neural() {
        let mut context = ctx("en-US");
        context.offline_first = true;
        let choice = select_backend(&context, &mut FixedCoin(true)).expect("select");
        assert_eq!(choice, BackendId::Neural);
    }

    #[test]
    fn language_gap_forces_neural() {
        // "yo" is in the registry but has no native support.
        let context = ctx("yo");
        let choice = select_backend(&context, &mut FixedCoin(true)).expect("select");
        assert_eq!(choice, BackendId::Neural);
    }

    #[test]
    fn privacy_mode_forces_neural() {
        let mut context = ctx("en-US");
        context.privacy_mode = true;
        let choice = select_backend(&context, &mut FixedCoin(true)).expect("select");
        assert_eq!(choice, BackendId::Neural);
    }

    #[test]
    fn preferences_resolve_as_documented() {
        let mut context = ctx("en-US");

        context.preference = PerformancePreference::Speed;
        assert_eq!(
            select_backend(&context, &mut FixedCoin(true)).expect("speed"),
            BackendId::Native
        );

        context.preference = PerformancePreference::Accuracy;
        assert_eq!(
            select_backend(&context, &mut FixedCoin(true)).expect("accuracy"),
            BackendId::Neural
        );

        context.preference = PerformancePreference::ResourceSaving;
        assert_eq!(
            select_backend(&context, &mut FixedCoin(true)).expect("resource"),
            BackendId::Neural
        );
    }

    #[test]
    fn balanced_follows_the_injected_coin() {
        let mut context = ctx("en-US");
        context.preference = PerformancePreference::Balanced;
        assert_eq!(
            select_backend(&context, &mut FixedCoin(true)).expect("heads"),
            BackendId::Native
        );
        assert_eq!(
            select_backend(&context, &mut FixedCoin(false)).expect("tails"),
            BackendId::Neural
        );
    }

    #[test]
    fn balanced_without_neural_is_deterministic() {
        let mut context = ctx("en-US");
        context.preference = PerformancePreference::Balanced;
        context.neural_available = false;
        for _ in 0..10 {
            assert_eq!(
                select_backend(&context, &mut SeededCoin::default()).expect("select"),
                BackendId::Native
            );
        }
    }

    #[test]
    fn no_backend_at_all_is_not_supported() {
        let mut context = ctx("en-US");
        context.native_available = false;
        context.neural_available = false;
        assert_eq!(
            select_backend(&context, &mut FixedCoin(true)),
            Err(RecognitionError::NotSupported)
        );
    }

    #[test]
    fn unknown_language_is_rejected() {
        let context = ctx("zz-ZZ");
        assert_eq!(
            select_backend(&context, &mut FixedCoin(true)),
            Err(RecognitionError::LanguageNotSupported("zz-ZZ".into()))
        );
    }

    #[test]
    fn seeded_coin_is_reproducible() {
        let mut a = SeededCoin::new(42);
        let mut b = SeededCoin::new(42);
        let run_a: Vec<bool> = (0..32).map(|_| a.flip()).collect();
        let run_b: Vec<bool> = (0..32).map(|_| b.flip()).collect();
        assert_eq!(run_a, run_b);
        assert!(run_a.iter().any(|&x| x) && run_a.iter().any(|&x| !x));
    }
}
