//! Run a test against named columns of a [`Table`]
//!
//! Each [`TestRequest`] names the columns it reads and carries the options
//! of the underlying test. Rows with a missing value in any of those columns
//! are rejected or dropped according to the options' [`MissingPolicy`]
//! before the test sees the data.

use std::collections::{BTreeMap, BTreeSet};

use crate::data::{Column, Table};
use crate::models::{linear_regression, Predictors, RegressionResult};
use crate::tests::anova::{one_way_anova, two_way_anova_named};
use crate::tests::correlation::correlation_test;
use crate::tests::parametric::{one_sample_t_test, two_sample_t_test};
use crate::tests::posthoc::{tukey_hsd, TukeyHsdResult};
use crate::tests::{AnovaResult, AnovaTable, CorrelationResult, TestResult};
use crate::types::{
    AnovaOptions, CorrelationOptions, MissingPolicy, RegressionOptions, TTestOptions, TukeyOptions,
};
use crate::{StatsError, StatsResult};

/// One term on the right-hand side of a regression request
#[derive(Debug, Clone, PartialEq)]
pub enum ModelTerm {
    /// A column; numeric columns enter as-is, categorical columns are
    /// dummy-coded against their first sorted level
    Column(String),
    /// A categorical column with an explicit reference level
    Categorical { column: String, reference: String },
    /// Interaction between two columns already in the model
    Interaction(String, String),
}

impl ModelTerm {
    pub fn column(name: impl Into<String>) -> Self {
        ModelTerm::Column(name.into())
    }

    pub fn interaction(a: impl Into<String>, b: impl Into<String>) -> Self {
        ModelTerm::Interaction(a.into(), b.into())
    }
}

/// A test to run on a table
#[derive(Debug, Clone)]
pub enum TestRequest {
    OneSampleT {
        column: String,
        mu: f64,
        options: TTestOptions,
    },
    /// Unpaired comparison of `value` between the two levels of `group`
    TwoSampleT {
        value: String,
        group: String,
        equal_variance: bool,
        options: TTestOptions,
    },
    /// Paired comparison on a long-format table: one row per subject and
    /// condition, `condition` having exactly two levels
    PairedT {
        value: String,
        condition: String,
        subject: String,
        options: TTestOptions,
    },
    OneWayAnova {
        value: String,
        group: String,
        options: AnovaOptions,
    },
    TwoWayAnova {
        value: String,
        factor_a: String,
        factor_b: String,
        options: AnovaOptions,
    },
    TukeyHsd {
        value: String,
        group: String,
        options: TukeyOptions,
    },
    Correlation {
        x: String,
        y: String,
        options: CorrelationOptions,
    },
    Regression {
        response: String,
        terms: Vec<ModelTerm>,
        options: RegressionOptions,
    },
}

impl TestRequest {
    pub fn one_sample_t(column: impl Into<String>, mu: f64) -> Self {
        TestRequest::OneSampleT {
            column: column.into(),
            mu,
            options: TTestOptions::default(),
        }
    }

    /// Welch two-sample t-test
    pub fn two_sample_t(value: impl Into<String>, group: impl Into<String>) -> Self {
        TestRequest::TwoSampleT {
            value: value.into(),
            group: group.into(),
            equal_variance: false,
            options: TTestOptions::default(),
        }
    }

    pub fn paired_t(
        value: impl Into<String>,
        condition: impl Into<String>,
        subject: impl Into<String>,
    ) -> Self {
        TestRequest::PairedT {
            value: value.into(),
            condition: condition.into(),
            subject: subject.into(),
            options: TTestOptions::default(),
        }
    }

    pub fn one_way_anova(value: impl Into<String>, group: impl Into<String>) -> Self {
        TestRequest::OneWayAnova {
            value: value.into(),
            group: group.into(),
            options: AnovaOptions::default(),
        }
    }

    pub fn two_way_anova(
        value: impl Into<String>,
        factor_a: impl Into<String>,
        factor_b: impl Into<String>,
    ) -> Self {
        TestRequest::TwoWayAnova {
            value: value.into(),
            factor_a: factor_a.into(),
            factor_b: factor_b.into(),
            options: AnovaOptions::default(),
        }
    }

    pub fn tukey_hsd(value: impl Into<String>, group: impl Into<String>) -> Self {
        TestRequest::TukeyHsd {
            value: value.into(),
            group: group.into(),
            options: TukeyOptions::default(),
        }
    }

    /// Pearson correlation test
    pub fn correlation(x: impl Into<String>, y: impl Into<String>) -> Self {
        TestRequest::Correlation {
            x: x.into(),
            y: y.into(),
            options: CorrelationOptions::default(),
        }
    }

    pub fn regression(response: impl Into<String>, terms: Vec<ModelTerm>) -> Self {
        TestRequest::Regression {
            response: response.into(),
            terms,
            options: RegressionOptions::default(),
        }
    }

    /// Name of the operation this request runs
    pub fn operation(&self) -> &'static str {
        match self {
            TestRequest::OneSampleT { .. } => "one_sample_t_test",
            TestRequest::TwoSampleT { .. } | TestRequest::PairedT { .. } => "two_sample_t_test",
            TestRequest::OneWayAnova { .. } => "one_way_anova",
            TestRequest::TwoWayAnova { .. } => "two_way_anova",
            TestRequest::TukeyHsd { .. } => "tukey_hsd",
            TestRequest::Correlation { .. } => "correlation_test",
            TestRequest::Regression { .. } => "linear_regression",
        }
    }
}

/// Result of [`run`], one variant per kind of result
#[derive(Debug, Clone)]
pub enum TestOutcome {
    TTest(TestResult),
    OneWayAnova(AnovaResult),
    TwoWayAnova(AnovaTable),
    TukeyHsd(TukeyHsdResult),
    Correlation(CorrelationResult),
    Regression(Box<RegressionResult>),
}

impl TestOutcome {
    pub fn as_t_test(&self) -> Option<&TestResult> {
        match self {
            TestOutcome::TTest(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_one_way_anova(&self) -> Option<&AnovaResult> {
        match self {
            TestOutcome::OneWayAnova(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_anova_table(&self) -> Option<&AnovaTable> {
        match self {
            TestOutcome::TwoWayAnova(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_tukey_hsd(&self) -> Option<&TukeyHsdResult> {
        match self {
            TestOutcome::TukeyHsd(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_correlation(&self) -> Option<&CorrelationResult> {
        match self {
            TestOutcome::Correlation(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_regression(&self) -> Option<&RegressionResult> {
        match self {
            TestOutcome::Regression(r) => Some(r.as_ref()),
            _ => None,
        }
    }
}

/// Run `request` against `table`
///
/// # Errors
/// `UnknownColumn` / `ColumnType` for bad column references, `MissingValue`
/// when a referenced column has gaps under `MissingPolicy::Error`, plus any
/// error of the underlying test.
pub fn run(table: &Table, request: &TestRequest) -> StatsResult<TestOutcome> {
    let op = request.operation();
    tracing::debug!(op, rows = table.n_rows(), "running test on table");

    match request {
        TestRequest::OneSampleT {
            column,
            mu,
            options,
        } => {
            let values = table.numeric(column)?;
            let rows = usable_rows(table, op, &[column], options.missing)?;
            let sample = numeric_at(values, &rows);
            one_sample_t_test(&sample, *mu, options).map(TestOutcome::TTest)
        }

        TestRequest::TwoSampleT {
            value,
            group,
            equal_variance,
            options,
        } => {
            let values = table.numeric(value)?;
            let labels = table.categorical(group)?;
            let rows = usable_rows(table, op, &[value, group], options.missing)?;
            let (levels, split) = split_two_levels(op, group, values, labels, &rows)?;
            tracing::debug!(op, x = %levels[0], y = %levels[1], "comparing groups");
            two_sample_t_test(&split[0], &split[1], false, *equal_variance, options)
                .map(TestOutcome::TTest)
        }

        TestRequest::PairedT {
            value,
            condition,
            subject,
            options,
        } => {
            let (x, y) = paired_values(table, op, value, condition, subject, options.missing)?;
            two_sample_t_test(&x, &y, true, false, options).map(TestOutcome::TTest)
        }

        TestRequest::OneWayAnova {
            value,
            group,
            options,
        } => {
            let (y, g) = grouped(table, op, value, group, options.missing)?;
            one_way_anova(&y, &g, options).map(TestOutcome::OneWayAnova)
        }

        TestRequest::TwoWayAnova {
            value,
            factor_a,
            factor_b,
            options,
        } => {
            let values = table.numeric(value)?;
            let la = table.categorical(factor_a)?;
            let lb = table.categorical(factor_b)?;
            let rows = usable_rows(table, op, &[value, factor_a, factor_b], options.missing)?;
            let y = numeric_at(values, &rows);
            let a = labels_at(la, &rows);
            let b = labels_at(lb, &rows);
            let a: Vec<&str> = a.iter().map(String::as_str).collect();
            let b: Vec<&str> = b.iter().map(String::as_str).collect();
            two_way_anova_named(&y, (factor_a, &a), (factor_b, &b), options)
                .map(TestOutcome::TwoWayAnova)
        }

        TestRequest::TukeyHsd {
            value,
            group,
            options,
        } => {
            let (y, g) = grouped(table, op, value, group, options.missing)?;
            tukey_hsd(&y, &g, options).map(TestOutcome::TukeyHsd)
        }

        TestRequest::Correlation { x, y, options } => {
            let xs = table.numeric(x)?;
            let ys = table.numeric(y)?;
            let rows = usable_rows(table, op, &[x, y], options.missing)?;
            correlation_test(&numeric_at(xs, &rows), &numeric_at(ys, &rows), options)
                .map(TestOutcome::Correlation)
        }

        TestRequest::Regression {
            response,
            terms,
            options,
        } => {
            let y = table.numeric(response)?;
            let mut columns: Vec<&str> = vec![response.as_str()];
            for term in terms {
                match term {
                    ModelTerm::Column(c) | ModelTerm::Categorical { column: c, .. } => {
                        columns.push(c.as_str())
                    }
                    ModelTerm::Interaction(a, b) => columns.extend([a.as_str(), b.as_str()]),
                }
            }
            // Type errors take precedence over missing values
            for c in &columns {
                table.column(c)?;
            }
            let rows = usable_rows(table, op, &columns, options.missing)?;
            let predictors = build_predictors(table, terms, &rows)?;
            linear_regression(&numeric_at(y, &rows), &predictors, options)
                .map(|r| TestOutcome::Regression(Box::new(r)))
        }
    }
}

/// Rows with no missing value in `columns`, or `MissingValue` when gaps
/// exist and the policy forbids dropping them
fn usable_rows<S: AsRef<str>>(
    table: &Table,
    op: &'static str,
    columns: &[S],
    policy: MissingPolicy,
) -> StatsResult<Vec<usize>> {
    let names: Vec<&str> = columns.iter().map(|c| c.as_ref()).collect();
    let rows = table.complete_rows(&names)?;
    let dropped = table.n_rows() - rows.len();
    if dropped == 0 {
        return Ok(rows);
    }

    match policy {
        MissingPolicy::Error => {
            let mut field = names.first().copied().unwrap_or_default();
            for &name in &names {
                let column = table.column(name)?;
                if (0..column.len()).any(|r| column.is_missing(r)) {
                    field = name;
                    break;
                }
            }
            Err(StatsError::MissingValue {
                op,
                field: field.to_string(),
            })
        }
        MissingPolicy::ExcludeListwise => {
            tracing::warn!(op, dropped, "excluded rows with missing values");
            Ok(rows)
        }
    }
}

fn numeric_at(values: &[Option<f64>], rows: &[usize]) -> Vec<f64> {
    rows.iter().map(|&r| values[r].unwrap_or(f64::NAN)).collect()
}

fn labels_at(labels: &[Option<String>], rows: &[usize]) -> Vec<String> {
    rows.iter()
        .map(|&r| labels[r].clone().unwrap_or_default())
        .collect()
}

fn grouped(
    table: &Table,
    op: &'static str,
    value: &str,
    group: &str,
    policy: MissingPolicy,
) -> StatsResult<(Vec<f64>, Vec<String>)> {
    let values = table.numeric(value)?;
    let labels = table.categorical(group)?;
    let rows = usable_rows(table, op, &[value, group], policy)?;
    Ok((numeric_at(values, &rows), labels_at(labels, &rows)))
}

/// Split values by a grouping column that must have exactly two levels
fn split_two_levels(
    op: &'static str,
    group: &str,
    values: &[Option<f64>],
    labels: &[Option<String>],
    rows: &[usize],
) -> StatsResult<(Vec<String>, [Vec<f64>; 2])> {
    let mut by_level: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for &r in rows {
        if let (Some(v), Some(l)) = (values[r], labels[r].as_deref()) {
            by_level.entry(l).or_default().push(v);
        }
    }
    if by_level.len() != 2 {
        return Err(StatsError::InsufficientGroups {
            op,
            reason: format!(
                "column '{}' must have exactly 2 levels, found {}",
                group,
                by_level.len()
            ),
        });
    }

    let levels: Vec<String> = by_level.keys().map(|l| l.to_string()).collect();
    let mut groups = by_level.into_values();
    let x = groups.next().unwrap_or_default();
    let y = groups.next().unwrap_or_default();
    Ok((levels, [x, y]))
}

/// Pair the two condition values of each subject, in sorted subject order
///
/// Returns the values of the first and the second condition level.
fn paired_values(
    table: &Table,
    op: &'static str,
    value: &str,
    condition: &str,
    subject: &str,
    policy: MissingPolicy,
) -> StatsResult<(Vec<f64>, Vec<f64>)> {
    let values = table.numeric(value)?;
    let conditions = table.categorical(condition)?;
    let subjects = table.categorical(subject)?;
    let rows = usable_rows(table, op, &[value, condition, subject], policy)?;

    let levels: BTreeSet<&str> = rows.iter().filter_map(|&r| conditions[r].as_deref()).collect();
    let levels: Vec<&str> = levels.into_iter().collect();
    if levels.len() != 2 {
        return Err(StatsError::InsufficientGroups {
            op,
            reason: format!(
                "condition column '{}' must have exactly 2 levels, found {}",
                condition,
                levels.len()
            ),
        });
    }

    let mut cells: BTreeMap<&str, [Option<f64>; 2]> = BTreeMap::new();
    for &r in &rows {
        let (Some(v), Some(c), Some(s)) =
            (values[r], conditions[r].as_deref(), subjects[r].as_deref())
        else {
            continue;
        };
        let slot = usize::from(c == levels[1]);
        let cell = &mut cells.entry(s).or_default()[slot];
        if cell.is_some() {
            return Err(StatsError::InvalidParameter {
                op,
                reason: format!(
                    "subject '{}' has more than one value for condition '{}'",
                    s, c
                ),
            });
        }
        *cell = Some(v);
    }

    let mut x = Vec::with_capacity(cells.len());
    let mut y = Vec::with_capacity(cells.len());
    let mut unmatched = 0;
    for (s, cell) in &cells {
        match cell {
            [Some(a), Some(b)] => {
                x.push(*a);
                y.push(*b);
            }
            _ if policy == MissingPolicy::Error => {
                tracing::debug!(op, subject = %s, "subject lacks one condition");
                return Err(StatsError::MissingValue {
                    op,
                    field: value.to_string(),
                });
            }
            _ => unmatched += 1,
        }
    }
    if unmatched > 0 {
        tracing::warn!(op, unmatched, "excluded subjects without both conditions");
    }
    Ok((x, y))
}

fn build_predictors(table: &Table, terms: &[ModelTerm], rows: &[usize]) -> StatsResult<Predictors> {
    let mut predictors = Predictors::new();
    for term in terms {
        predictors = match term {
            ModelTerm::Column(name) => match table.column(name)? {
                Column::Numeric(v) => predictors.numeric(name.as_str(), &numeric_at(v, rows)),
                Column::Categorical(v) => {
                    predictors.categorical(name.as_str(), &labels_at(v, rows))
                }
            },
            ModelTerm::Categorical { column, reference } => {
                let labels = labels_at(table.categorical(column)?, rows);
                predictors.categorical_with_reference(column.as_str(), &labels, reference)
            }
            ModelTerm::Interaction(a, b) => predictors.interaction(a, b),
        };
    }
    Ok(predictors)
}
