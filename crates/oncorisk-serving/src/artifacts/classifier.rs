//! Fitted classifiers.
//!
//! Tree models use the scikit-learn layout: nodes stored in pre-order, a split
//! sends a sample left when `x[feature] <= threshold`, and a leaf carries one
//! value per class (counts or fractions, normalised on load). Forest
//! prediction averages per-tree class probabilities and picks the argmax, with
//! the first class winning ties.

use super::{check_columns, check_finite};
use crate::error::{ServingError, ServingResult};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

/// An opaque decision function returning one class label per input row.
pub trait Classifier: Send + Sync {
    /// Estimator name used in error messages.
    fn name(&self) -> &'static str;

    /// Number of columns the classifier was fitted on, if known.
    fn n_features(&self) -> Option<usize>;

    /// Class labels in output order.
    fn classes(&self) -> &[i64];

    /// Number of fitted sub-estimators.
    fn estimator_count(&self) -> usize {
        1
    }

    /// Predict a class for each row of a `(rows, features)` matrix.
    fn predict(&self, input: ArrayView2<'_, f64>) -> ServingResult<Vec<i64>>;
}

/// Serialized classifier body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClassifierSpec {
    /// Bagged ensemble of decision trees.
    RandomForest(RandomForestSpec),
    /// Single decision tree.
    DecisionTree(DecisionTreeSpec),
    /// Linear model with logistic link.
    LogisticRegression(LogisticRegressionSpec),
}

/// Serialized random forest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForestSpec {
    /// Class labels, in probability column order
    pub classes: Vec<i64>,
    /// Fitted feature count
    pub n_features: usize,
    /// Member trees
    pub trees: Vec<TreeSpec>,
}

/// Serialized single decision tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTreeSpec {
    /// Class labels, in probability column order
    pub classes: Vec<i64>,
    /// Fitted feature count
    pub n_features: usize,
    /// Nodes in pre-order; index 0 is the root
    pub nodes: Vec<TreeNode>,
}

/// One member tree of a forest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeSpec {
    /// Nodes in pre-order; index 0 is the root
    pub nodes: Vec<TreeNode>,
}

/// A single tree node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    /// Internal node. Samples with `x[feature] <= threshold` go left.
    Split {
        /// Feature column tested
        feature: usize,
        /// Split threshold
        threshold: f64,
        /// Index of the left child
        left: usize,
        /// Index of the right child
        right: usize,
    },
    /// Terminal node with per-class weights.
    Leaf {
        /// Class weights or counts
        value: Vec<f64>,
    },
}

/// Serialized logistic regression.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegressionSpec {
    /// Class labels
    pub classes: Vec<i64>,
    /// One coefficient row per decision column
    pub coef: Vec<Vec<f64>>,
    /// One intercept per decision column
    pub intercept: Vec<f64>,
}

impl ClassifierSpec {
    /// Validate the spec and build the fitted classifier.
    pub fn build(self) -> ServingResult<Box<dyn Classifier>> {
        match self {
            ClassifierSpec::RandomForest(s) => Ok(Box::new(RandomForest::from_spec(s)?)),
            ClassifierSpec::DecisionTree(s) => Ok(Box::new(DecisionTree::from_spec(s)?)),
            ClassifierSpec::LogisticRegression(s) => {
                Ok(Box::new(LogisticRegression::from_spec(s)?))
            }
        }
    }
}

fn validate_classes(estimator: &str, classes: &[i64]) -> ServingResult<()> {
    if classes.is_empty() {
        return Err(ServingError::invalid_artifact(format!(
            "{estimator} has no classes"
        )));
    }
    Ok(())
}

/// Index of the largest value; the first one wins ties.
fn argmax(values: ArrayView1<'_, f64>) -> usize {
    let mut best = 0;
    for (idx, v) in values.iter().enumerate() {
        if *v > values[best] {
            best = idx;
        }
    }
    best
}

/// Validated tree with leaves normalised to probabilities.
#[derive(Debug, Clone)]
struct FittedTree {
    nodes: Vec<FittedNode>,
}

#[derive(Debug, Clone)]
enum FittedNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf(Array1<f64>),
}

impl FittedTree {
    fn from_nodes(
        nodes: Vec<TreeNode>,
        n_features: usize,
        n_classes: usize,
    ) -> Result<Self, String> {
        if nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }
        let len = nodes.len();
        let mut fitted = Vec::with_capacity(len);
        for (idx, node) in nodes.into_iter().enumerate() {
            let node = match node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if feature >= n_features {
                        return Err(format!(
                            "node {idx} splits on feature {feature}, model has {n_features}"
                        ));
                    }
                    // Pre-order layout: children always follow their parent.
                    if left <= idx || right <= idx || left >= len || right >= len {
                        return Err(format!(
                            "node {idx} has invalid children ({left}, {right})"
                        ));
                    }
                    if !threshold.is_finite() {
                        return Err(format!("node {idx} has a non-finite threshold"));
                    }
                    FittedNode::Split {
                        feature,
                        threshold,
                        left,
                        right,
                    }
                }
                TreeNode::Leaf { value } => {
                    if value.len() != n_classes {
                        return Err(format!(
                            "leaf {idx} has {} values, expected {n_classes}",
                            value.len()
                        ));
                    }
                    if value.iter().any(|v| !v.is_finite() || *v < 0.0) {
                        return Err(format!("leaf {idx} has negative or non-finite values"));
                    }
                    let total: f64 = value.iter().sum();
                    if total <= 0.0 {
                        return Err(format!("leaf {idx} is empty"));
                    }
                    FittedNode::Leaf(Array1::from(value) / total)
                }
            };
            fitted.push(node);
        }
        Ok(Self { nodes: fitted })
    }

    fn proba(&self, row: ArrayView1<'_, f64>) -> &Array1<f64> {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                FittedNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if row[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
                FittedNode::Leaf(value) => return value,
            }
        }
    }
}

/// Fitted single decision tree.
#[derive(Debug, Clone)]
pub struct DecisionTree {
    classes: Vec<i64>,
    n_features: usize,
    tree: FittedTree,
}

impl DecisionTree {
    const NAME: &'static str = "DecisionTreeClassifier";

    /// Build from a serialized spec.
    pub fn from_spec(spec: DecisionTreeSpec) -> ServingResult<Self> {
        validate_classes(Self::NAME, &spec.classes)?;
        let tree = FittedTree::from_nodes(spec.nodes, spec.n_features, spec.classes.len())
            .map_err(ServingError::invalid_artifact)?;
        Ok(Self {
            classes: spec.classes,
            n_features: spec.n_features,
            tree,
        })
    }
}

impl Classifier for DecisionTree {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn n_features(&self) -> Option<usize> {
        Some(self.n_features)
    }

    fn classes(&self) -> &[i64] {
        &self.classes
    }

    fn predict(&self, input: ArrayView2<'_, f64>) -> ServingResult<Vec<i64>> {
        check_columns(Self::NAME, Some(self.n_features), &input)?;
        check_finite(&input)?;
        Ok(input
            .rows()
            .into_iter()
            .map(|row| self.classes[argmax(self.tree.proba(row).view())])
            .collect())
    }
}

/// Fitted random forest.
#[derive(Debug, Clone)]
pub struct RandomForest {
    classes: Vec<i64>,
    n_features: usize,
    trees: Vec<FittedTree>,
}

impl RandomForest {
    const NAME: &'static str = "RandomForestClassifier";

    /// Build from a serialized spec.
    pub fn from_spec(spec: RandomForestSpec) -> ServingResult<Self> {
        validate_classes(Self::NAME, &spec.classes)?;
        if spec.trees.is_empty() {
            return Err(ServingError::invalid_artifact(
                "RandomForestClassifier has no trees",
            ));
        }
        let n_classes = spec.classes.len();
        let trees = spec
            .trees
            .into_iter()
            .enumerate()
            .map(|(i, t)| {
                FittedTree::from_nodes(t.nodes, spec.n_features, n_classes)
                    .map_err(|e| ServingError::invalid_artifact(format!("tree {i}: {e}")))
            })
            .collect::<ServingResult<Vec<_>>>()?;
        Ok(Self {
            classes: spec.classes,
            n_features: spec.n_features,
            trees,
        })
    }

    /// Mean class probabilities for one row of fitted width.
    pub(crate) fn predict_proba_row(&self, row: ArrayView1<'_, f64>) -> Array1<f64> {
        let mut acc = Array1::<f64>::zeros(self.classes.len());
        for tree in &self.trees {
            acc += tree.proba(row);
        }
        acc / self.trees.len() as f64
    }
}

impl Classifier for RandomForest {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn n_features(&self) -> Option<usize> {
        Some(self.n_features)
    }

    fn classes(&self) -> &[i64] {
        &self.classes
    }

    fn estimator_count(&self) -> usize {
        self.trees.len()
    }

    fn predict(&self, input: ArrayView2<'_, f64>) -> ServingResult<Vec<i64>> {
        check_columns(Self::NAME, Some(self.n_features), &input)?;
        check_finite(&input)?;
        Ok(input
            .rows()
            .into_iter()
            .map(|row| self.classes[argmax(self.predict_proba_row(row).view())])
            .collect())
    }
}

/// Fitted logistic regression.
#[derive(Debug, Clone)]
pub struct LogisticRegression {
    classes: Vec<i64>,
    coef: Array2<f64>,
    intercept: Array1<f64>,
}

impl LogisticRegression {
    const NAME: &'static str = "LogisticRegression";

    /// Build from a serialized spec.
    pub fn from_spec(spec: LogisticRegressionSpec) -> ServingResult<Self> {
        validate_classes(Self::NAME, &spec.classes)?;
        if spec.classes.len() < 2 {
            return Err(ServingError::invalid_artifact(
                "LogisticRegression needs at least two classes",
            ));
        }
        let n_rows = spec.coef.len();
        let n_features = spec.coef.first().map(Vec::len).unwrap_or(0);
        let binary = spec.classes.len() == 2 && n_rows == 1;
        if !binary && n_rows != spec.classes.len() {
            return Err(ServingError::invalid_artifact(format!(
                "LogisticRegression has {n_rows} coefficient rows for {} classes",
                spec.classes.len()
            )));
        }
        if n_features == 0 || spec.coef.iter().any(|r| r.len() != n_features) {
            return Err(ServingError::invalid_artifact(
                "LogisticRegression coefficient rows must be non-empty and equal length",
            ));
        }
        if spec.intercept.len() != n_rows {
            return Err(ServingError::invalid_artifact(format!(
                "LogisticRegression has {} intercepts for {n_rows} coefficient rows",
                spec.intercept.len()
            )));
        }
        let flat: Vec<f64> = spec.coef.into_iter().flatten().collect();
        let coef = Array2::from_shape_vec((n_rows, n_features), flat)
            .map_err(|e| ServingError::invalid_artifact(e.to_string()))?;
        Ok(Self {
            classes: spec.classes,
            coef,
            intercept: Array1::from(spec.intercept),
        })
    }

    /// Raw decision values, one column per coefficient row.
    pub fn decision_function(&self, input: ArrayView2<'_, f64>) -> Array2<f64> {
        input.dot(&self.coef.t()) + &self.intercept
    }
}

impl Classifier for LogisticRegression {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn n_features(&self) -> Option<usize> {
        Some(self.coef.ncols())
    }

    fn classes(&self) -> &[i64] {
        &self.classes
    }

    fn predict(&self, input: ArrayView2<'_, f64>) -> ServingResult<Vec<i64>> {
        check_columns(Self::NAME, Some(self.coef.ncols()), &input)?;
        check_finite(&input)?;
        let scores = self.decision_function(input);
        Ok(scores
            .rows()
            .into_iter()
            .map(|row| {
                if self.coef.nrows() == 1 {
                    self.classes[usize::from(row[0] > 0.0)]
                } else {
                    self.classes[argmax(row)]
                }
            })
            .collect())
    }
}
