//! Repayment-risk classifier
//!
//! A shallow smartcore decision tree over `(amount, dependents,
//! credit_limit)`. Training data is whatever historical rows carry all
//! three risk fields, so the model is small and only indicative.

use serde::{Deserialize, Serialize};
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::tree::decision_tree_classifier::{
    DecisionTreeClassifier, DecisionTreeClassifierParameters,
};
use std::fmt;
use tracing::info;

use crate::error::{DashboardError, Result};
use crate::models::{RiskStatus, SalesRecord};

pub const DEFAULT_MAX_DEPTH: u16 = 4;

/// One ad-hoc customer to classify
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RiskInput {
    pub amount: f64,
    pub dependents: f64,
    pub credit_limit: f64,
}

impl Default for RiskInput {
    fn default() -> Self {
        Self {
            amount: 5_000_000.0,
            dependents: 2.0,
            credit_limit: 1_000_000.0,
        }
    }
}

impl RiskInput {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("amount", self.amount),
            ("dependents", self.dependents),
            ("credit_limit", self.credit_limit),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(DashboardError::InvalidInput(format!(
                    "{} must be a non-negative number",
                    name
                )));
            }
        }
        Ok(())
    }

    fn features(&self) -> Vec<f64> {
        vec![self.amount, self.dependents, self.credit_limit]
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct RiskAssessment {
    pub status: RiskStatus,
    /// Share of training customers the tree puts in `status` that really
    /// have that status, in 0..=1
    pub confidence: f64,
}

pub struct RiskModel {
    tree: DecisionTreeClassifier<f64, u32, DenseMatrix<f64>, Vec<u32>>,
    pub training_rows: usize,
    pub current_examples: usize,
    pub delinquent_examples: usize,
    /// In-sample precision per predicted class: (current, delinquent)
    precision: (f64, f64),
}

impl fmt::Debug for RiskModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RiskModel")
            .field("training_rows", &self.training_rows)
            .field("current_examples", &self.current_examples)
            .field("delinquent_examples", &self.delinquent_examples)
            .finish()
    }
}

fn precision_of(predicted: &[u32], actual: &[u32], class: u32) -> f64 {
    let (hits, total) = predicted
        .iter()
        .zip(actual)
        .filter(|(p, _)| **p == class)
        .fold((0usize, 0usize), |(hits, total), (_, a)| {
            (hits + usize::from(*a == class), total + 1)
        });
    if total == 0 {
        0.0
    } else {
        hits as f64 / total as f64
    }
}

impl RiskModel {
    /// Train on every record that carries a risk profile
    pub fn train(records: &[SalesRecord], max_depth: u16) -> Result<Self> {
        let (features, labels): (Vec<Vec<f64>>, Vec<u32>) = records
            .iter()
            .filter_map(|r| {
                r.risk.as_ref().map(|risk| {
                    (
                        vec![r.amount, risk.dependents, risk.credit_limit],
                        risk.status.label(),
                    )
                })
            })
            .unzip();

        let current = labels.iter().filter(|l| **l == RiskStatus::Current.label()).count();
        let delinquent = labels.len() - current;
        if current == 0 || delinquent == 0 {
            return Err(DashboardError::InsufficientClasses { current, delinquent });
        }

        let x = DenseMatrix::from_2d_vec(&features);
        let params = DecisionTreeClassifierParameters::default().with_max_depth(max_depth.max(1));
        let tree = DecisionTreeClassifier::fit(&x, &labels, params)
            .map_err(|e| DashboardError::Model(e.to_string()))?;

        let predicted = tree
            .predict(&x)
            .map_err(|e| DashboardError::Model(e.to_string()))?;
        let precision = (
            precision_of(&predicted, &labels, RiskStatus::Current.label()),
            precision_of(&predicted, &labels, RiskStatus::Delinquent.label()),
        );

        info!(
            "Trained risk tree on {} rows ({} current, {} delinquent, depth <= {})",
            labels.len(),
            current,
            delinquent,
            max_depth
        );

        Ok(Self {
            tree,
            training_rows: labels.len(),
            current_examples: current,
            delinquent_examples: delinquent,
            precision,
        })
    }

    pub fn classify(&self, input: &RiskInput) -> Result<RiskAssessment> {
        input.validate()?;
        let x = DenseMatrix::from_2d_vec(&vec![input.features()]);
        let predicted = self
            .tree
            .predict(&x)
            .map_err(|e| DashboardError::Model(e.to_string()))?;
        let label = predicted
            .first()
            .copied()
            .ok_or_else(|| DashboardError::Model("classifier returned no prediction".into()))?;

        let status = RiskStatus::from_label(label);
        let confidence = match status {
            RiskStatus::Current => self.precision.0,
            RiskStatus::Delinquent => self.precision.1,
        };
        Ok(RiskAssessment { status, confidence })
    }
}

/// Trained model, or why the risk panel is unavailable
#[derive(Debug)]
pub enum RiskState {
    Ready(RiskModel),
    Unavailable(String),
}

impl RiskState {
    pub fn build(records: &[SalesRecord], max_depth: u16) -> Self {
        if !records.iter().any(|r| r.risk.is_some()) {
            return RiskState::Unavailable("No rows carry customer-risk fields.".into());
        }
        match RiskModel::train(records, max_depth) {
            Ok(model) => RiskState::Ready(model),
            Err(e) => RiskState::Unavailable(format!("Not enough risk history: {}", e)),
        }
    }

    pub fn model(&self) -> Option<&RiskModel> {
        match self {
            RiskState::Ready(model) => Some(model),
            RiskState::Unavailable(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RiskProfile;
    use chrono::NaiveDate;

    fn customer(amount: f64, dependents: f64, credit_limit: f64, status: RiskStatus) -> SalesRecord {
        let mut r = SalesRecord::new(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(), amount);
        r.risk = Some(RiskProfile {
            dependents,
            credit_limit,
            status,
        });
        r
    }

    fn history() -> Vec<SalesRecord> {
        vec![
            customer(9_000_000.0, 1.0, 1_000_000.0, RiskStatus::Current),
            customer(8_000_000.0, 0.0, 2_000_000.0, RiskStatus::Current),
            customer(7_500_000.0, 2.0, 1_500_000.0, RiskStatus::Current),
            customer(1_500_000.0, 4.0, 5_000_000.0, RiskStatus::Delinquent),
            customer(2_000_000.0, 5.0, 4_000_000.0, RiskStatus::Delinquent),
            customer(1_000_000.0, 3.0, 6_000_000.0, RiskStatus::Delinquent),
        ]
    }

    #[test]
    fn test_separable_history_classifies_both_sides() {
        let model = RiskModel::train(&history(), DEFAULT_MAX_DEPTH).unwrap();
        assert_eq!(model.training_rows, 6);

        let good = model
            .classify(&RiskInput { amount: 8_500_000.0, dependents: 1.0, credit_limit: 1_200_000.0 })
            .unwrap();
        assert_eq!(good.status, RiskStatus::Current);
        assert!((good.confidence - 1.0).abs() < 1e-12);

        let bad = model
            .classify(&RiskInput { amount: 1_200_000.0, dependents: 4.0, credit_limit: 5_500_000.0 })
            .unwrap();
        assert_eq!(bad.status, RiskStatus::Delinquent);
    }

    #[test]
    fn test_single_class_history_is_rejected() {
        let only_current: Vec<SalesRecord> = history()
            .into_iter()
            .filter(|r| r.risk.as_ref().unwrap().status == RiskStatus::Current)
            .collect();
        let err = RiskModel::train(&only_current, DEFAULT_MAX_DEPTH).unwrap_err();
        assert!(matches!(
            err,
            DashboardError::InsufficientClasses { current: 3, delinquent: 0 }
        ));
    }

    #[test]
    fn test_state_without_risk_columns() {
        let plain = vec![SalesRecord::new(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(), 1.0)];
        let state = RiskState::build(&plain, DEFAULT_MAX_DEPTH);
        assert!(state.model().is_none());
    }

    #[test]
    fn test_negative_input_is_invalid() {
        let model = RiskModel::train(&history(), DEFAULT_MAX_DEPTH).unwrap();
        let err = model
            .classify(&RiskInput { amount: -1.0, ..RiskInput::default() })
            .unwrap_err();
        assert!(matches!(err, DashboardError::InvalidInput(_)));
    }

    #[test]
    fn test_precision_helper() {
        assert_eq!(precision_of(&[1, 1, 0], &[1, 0, 0], 1), 0.5);
        assert_eq!(precision_of(&[0, 0], &[0, 0], 1), 0.0);
    }
}
