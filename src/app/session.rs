//! The three models plus the edit path shared by every front end.
//!
//! A front end hands `Session::apply` a field and the raw text the user typed.
//! The text is parsed, validated, applied to the owning model, and the model
//! recomputes. Only then is the observer told what changed. When any step
//! fails the error is returned, the observer hears nothing, and every model
//! keeps its previous parameters and data.

use tracing::{info, warn};

use crate::config::Settings;
use crate::domain::{Field, params};
use crate::error::ModelResult;
use crate::models::{BinomialModel, OcCurve, QualityLimits, WeibullModel};

/// What an accepted edit changed.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelEvent {
    Binomial {
        field: Field,
        sample_size: u32,
        p_fail: f64,
        points: usize,
    },
    Weibull {
        field: Field,
        shape: f64,
        scale: f64,
    },
    /// `n` or `k` changed; the curve and both limits were recomputed.
    OcPlan {
        field: Field,
        sample_size: u32,
        acceptance_number: u32,
        limits: QualityLimits,
    },
    /// A risk or a quality limit changed, along with its partner.
    OcLimits { field: Field, limits: QualityLimits },
}

impl ModelEvent {
    pub fn field(&self) -> Field {
        match self {
            ModelEvent::Binomial { field, .. }
            | ModelEvent::Weibull { field, .. }
            | ModelEvent::OcPlan { field, .. }
            | ModelEvent::OcLimits { field, .. } => *field,
        }
    }

    /// One-line description for status bars and logs.
    pub fn summary(&self) -> String {
        match self {
            ModelEvent::Binomial {
                sample_size,
                p_fail,
                points,
                ..
            } => format!("Binomial n={sample_size}, p={p_fail} ({points} points)"),
            ModelEvent::Weibull { shape, scale, .. } => format!("Weibull m={shape}, c={scale}"),
            ModelEvent::OcPlan {
                sample_size,
                acceptance_number,
                limits,
                ..
            } => format!(
                "OC plan n={sample_size}, k={acceptance_number}: AQL={:.4}, RQL={:.4}",
                limits.aql, limits.rql
            ),
            ModelEvent::OcLimits { field, limits } => match field {
                Field::OcAlpha | Field::OcAql => {
                    format!("alpha={:.4} <-> AQL={:.4}", limits.alpha, limits.aql)
                }
                _ => format!("beta={:.4} <-> RQL={:.4}", limits.beta, limits.rql),
            },
        }
    }
}

/// Receives a notification after each accepted edit.
pub trait ModelObserver {
    fn model_changed(&mut self, event: &ModelEvent);
}

/// Collects events in order.
impl ModelObserver for Vec<ModelEvent> {
    fn model_changed(&mut self, event: &ModelEvent) {
        self.push(event.clone());
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    binomial: BinomialModel,
    weibull: WeibullModel,
    oc: OcCurve,
}

impl Session {
    pub fn new(settings: &Settings) -> ModelResult<Self> {
        Ok(Self {
            binomial: BinomialModel::new(settings.binomial.clone())?,
            weibull: WeibullModel::new(settings.weibull.clone())?,
            oc: OcCurve::new(settings.oc.clone())?,
        })
    }

    pub fn binomial(&self) -> &BinomialModel {
        &self.binomial
    }

    pub fn weibull(&self) -> &WeibullModel {
        &self.weibull
    }

    pub fn oc(&self) -> &OcCurve {
        &self.oc
    }

    /// Regenerate the OC grid. Not a `Field`: it is driven by view controls.
    pub fn set_oc_range(&mut self, p_end: f64, p_step: f64) -> ModelResult<()> {
        self.oc.set_range(p_end, p_step)
    }

    /// Current value of `field` as editable text.
    pub fn value_text(&self, field: Field) -> String {
        let limits = self.oc.limits();
        match field {
            Field::BinomialSampleSize => self.binomial.sample_size().to_string(),
            Field::BinomialPFail => self.binomial.p_fail().to_string(),
            Field::WeibullShape => self.weibull.shape().to_string(),
            Field::WeibullScale => self.weibull.scale().to_string(),
            Field::OcSampleSize => self.oc.sample_size().to_string(),
            Field::OcAcceptanceNumber => self.oc.acceptance_number().to_string(),
            Field::OcAlpha => format!("{:.4}", limits.alpha),
            Field::OcBeta => format!("{:.4}", limits.beta),
            Field::OcAql => format!("{:.5}", limits.aql),
            Field::OcRql => format!("{:.5}", limits.rql),
        }
    }

    /// Parse `text` for `field`, update the owning model, then notify `observer`.
    pub fn apply(
        &mut self,
        field: Field,
        text: &str,
        observer: &mut dyn ModelObserver,
    ) -> ModelResult<()> {
        match self.try_apply(field, text) {
            Ok(event) => {
                info!(field = field.name(), input = text.trim(), "{}", event.summary());
                observer.model_changed(&event);
                Ok(())
            }
            Err(err) => {
                warn!(field = field.name(), input = text, "rejected: {err}");
                Err(err)
            }
        }
    }

    fn try_apply(&mut self, field: Field, text: &str) -> ModelResult<ModelEvent> {
        match field {
            Field::BinomialSampleSize => {
                let n = params::parse_sample_size(text, self.binomial.max_sample_size())?;
                self.binomial.set_sample_size(n)?;
                Ok(self.binomial_event(field))
            }
            Field::BinomialPFail => {
                let p = params::parse_probability(field.name(), text)?;
                self.binomial.set_p_fail(p)?;
                Ok(self.binomial_event(field))
            }
            Field::WeibullShape => {
                let m = params::parse_positive(field.name(), text)?;
                self.weibull.set_shape(m)?;
                Ok(self.weibull_event(field))
            }
            Field::WeibullScale => {
                let c = params::parse_positive(field.name(), text)?;
                self.weibull.set_scale(c)?;
                Ok(self.weibull_event(field))
            }
            Field::OcSampleSize => {
                let n = params::parse_sample_size(text, self.oc.max_sample_size())?;
                self.oc.set_sample_size(n)?;
                Ok(self.oc_plan_event(field))
            }
            Field::OcAcceptanceNumber => {
                let k = params::parse_acceptance_number(text, self.oc.sample_size())?;
                self.oc.set_acceptance_number(k)?;
                Ok(self.oc_plan_event(field))
            }
            Field::OcAlpha => {
                self.oc.set_alpha(params::parse_probability(field.name(), text)?)?;
                Ok(self.oc_limits_event(field))
            }
            Field::OcAql => {
                self.oc.set_aql(params::parse_probability(field.name(), text)?)?;
                Ok(self.oc_limits_event(field))
            }
            Field::OcBeta => {
                self.oc.set_beta(params::parse_probability(field.name(), text)?)?;
                Ok(self.oc_limits_event(field))
            }
            Field::OcRql => {
                self.oc.set_rql(params::parse_probability(field.name(), text)?)?;
                Ok(self.oc_limits_event(field))
            }
        }
    }

    fn binomial_event(&self, field: Field) -> ModelEvent {
        ModelEvent::Binomial {
            field,
            sample_size: self.binomial.sample_size(),
            p_fail: self.binomial.p_fail(),
            points: self.binomial.series().len(),
        }
    }

    fn weibull_event(&self, field: Field) -> ModelEvent {
        ModelEvent::Weibull {
            field,
            shape: self.weibull.shape(),
            scale: self.weibull.scale(),
        }
    }

    fn oc_plan_event(&self, field: Field) -> ModelEvent {
        ModelEvent::OcPlan {
            field,
            sample_size: self.oc.sample_size(),
            acceptance_number: self.oc.acceptance_number(),
            limits: self.oc.limits(),
        }
    }

    fn oc_limits_event(&self, field: Field) -> ModelEvent {
        ModelEvent::OcLimits {
            field,
            limits: self.oc.limits(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModelError;

    fn session() -> Session {
        Session::new(&Settings::default()).unwrap()
    }

    #[test]
    fn accepted_edit_notifies_once() {
        let mut s = session();
        let mut events = Vec::new();
        s.apply(Field::BinomialSampleSize, " 20 ", &mut events).unwrap();

        assert_eq!(s.binomial().sample_size(), 20);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].field(), Field::BinomialSampleSize);
        assert!(matches!(events[0], ModelEvent::Binomial { sample_size: 20, .. }));
    }

    #[test]
    fn rejected_edit_is_silent_and_keeps_state() {
        let mut s = session();
        let mut events = Vec::new();
        let before = s.binomial().series().clone();

        for text in ["", "abc", "-3", "0", "1.5", "20000"] {
            assert!(s.apply(Field::BinomialSampleSize, text, &mut events).is_err(), "{text:?}");
        }
        for text in ["1.2", "-0.1", "nan", "p"] {
            assert!(s.apply(Field::BinomialPFail, text, &mut events).is_err(), "{text:?}");
        }
        assert!(s.apply(Field::WeibullShape, "0", &mut events).is_err());
        assert!(s.apply(Field::WeibullScale, "-2", &mut events).is_err());

        assert!(events.is_empty());
        assert_eq!(s.binomial().series(), &before);
        assert_eq!(s.weibull().shape(), 1.0);
        assert_eq!(s.weibull().scale(), 1.0);
    }

    #[test]
    fn parse_errors_name_the_field() {
        let mut s = session();
        let err = s.apply(Field::WeibullShape, "two", &mut Vec::new()).unwrap_err();
        assert_eq!(
            err,
            ModelError::Parse {
                name: "shape parameter",
                input: "two".to_string(),
                expected: "number",
            }
        );
    }

    #[test]
    fn oc_plan_requires_k_below_n() {
        let mut s = session();
        let mut events = Vec::new();
        assert!(s.apply(Field::OcSampleSize, "3", &mut events).is_err());
        assert!(s.apply(Field::OcAcceptanceNumber, "300", &mut events).is_err());
        assert!(events.is_empty());

        s.apply(Field::OcAcceptanceNumber, "0", &mut events).unwrap();
        s.apply(Field::OcSampleSize, "3", &mut events).unwrap();
        assert_eq!(s.oc().sample_size(), 3);
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn aql_edit_moves_alpha() {
        let mut s = session();
        let mut events = Vec::new();
        s.apply(Field::OcAql, "0.01", &mut events).unwrap();

        let limits = s.oc().limits();
        assert_eq!(limits.aql, 0.01);
        // 1 - P(X <= 3; 300, 0.01)
        assert!((limits.alpha - 0.35277).abs() < 1e-3, "{}", limits.alpha);
        assert!(events[0].summary().starts_with("alpha="));
    }

    #[test]
    fn beta_edit_moves_rql() {
        let mut s = session();
        let mut events = Vec::new();
        s.apply(Field::OcBeta, "0.10", &mut events).unwrap();
        assert!((s.oc().limits().rql - 0.022133).abs() < 2e-4);
        assert!(events[0].summary().starts_with("beta="));
    }

    #[test]
    fn value_text_reflects_model() {
        let s = session();
        assert_eq!(s.value_text(Field::BinomialSampleSize), "100");
        assert_eq!(s.value_text(Field::BinomialPFail), "0.05");
        assert_eq!(s.value_text(Field::OcAlpha), "0.0500");
    }

    #[test]
    fn oc_range_regenerates_grid() {
        let mut s = session();
        s.set_oc_range(0.1, 0.0005).unwrap();
        assert!(s.oc().p().len() > 150);
        assert!(*s.oc().p().last().unwrap() < 0.1);

        let before = s.oc().p().len();
        assert!(s.set_oc_range(0.1, 0.2).is_err());
        assert_eq!(s.oc().p().len(), before);
    }
}
