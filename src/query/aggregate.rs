//! Aggregations over the values of one key

use crate::graph::{Element, PropertyValue};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Aggregation {
    Sum,
    Average,
    Count,
    Min,
    Max,
}

/// Internal state for an aggregator
#[derive(Debug, Clone)]
enum AggregatorState {
    Count(i64),
    Sum { sum: f64, seen: bool },
    Avg { sum: f64, count: i64 },
    Min(Option<f64>),
    Max(Option<f64>),
}

impl AggregatorState {
    fn new(aggregation: Aggregation) -> Self {
        match aggregation {
            Aggregation::Count => AggregatorState::Count(0),
            Aggregation::Sum => AggregatorState::Sum { sum: 0.0, seen: false },
            Aggregation::Average => AggregatorState::Avg { sum: 0.0, count: 0 },
            Aggregation::Min => AggregatorState::Min(None),
            Aggregation::Max => AggregatorState::Max(None),
        }
    }

    fn update(&mut self, value: &PropertyValue) {
        if let AggregatorState::Count(c) = self {
            *c += 1;
            return;
        }
        // numeric aggregations skip anything without a numeric reading
        let Some(x) = value.as_f64() else {
            return;
        };
        match self {
            AggregatorState::Count(_) => {}
            AggregatorState::Sum { sum, seen } => {
                *sum += x;
                *seen = true;
            }
            AggregatorState::Avg { sum, count } => {
                *sum += x;
                *count += 1;
            }
            AggregatorState::Min(curr) => *curr = Some(curr.map_or(x, |c| c.min(x))),
            AggregatorState::Max(curr) => *curr = Some(curr.map_or(x, |c| c.max(x))),
        }
    }

    fn result(&self) -> PropertyValue {
        match self {
            AggregatorState::Count(c) => PropertyValue::Integer(*c),
            AggregatorState::Sum { sum, seen } => {
                if *seen {
                    PropertyValue::Float(*sum)
                } else {
                    PropertyValue::Null
                }
            }
            AggregatorState::Avg { sum, count } => {
                if *count == 0 {
                    PropertyValue::Null
                } else {
                    PropertyValue::Float(*sum / *count as f64)
                }
            }
            AggregatorState::Min(val) | AggregatorState::Max(val) => {
                val.map(PropertyValue::Float).unwrap_or(PropertyValue::Null)
            }
        }
    }
}

/// Fold every value stored under `key` across `elements`.
///
/// `Count` counts values (an empty walk yields `Integer(0)`); the numeric
/// aggregations read integers and floats as `f64` and yield `Null` when no
/// numeric value was seen.
pub fn aggregate<'e, I>(elements: I, key: &str, aggregation: Aggregation) -> PropertyValue
where
    I: IntoIterator<Item = &'e dyn Element>,
{
    let mut state = AggregatorState::new(aggregation);
    for element in elements {
        for value in element.values(key) {
            state.update(value);
        }
    }
    state.result()
}

/// Fold a plain list of values
pub fn aggregate_values<'v, I>(values: I, aggregation: Aggregation) -> PropertyValue
where
    I: IntoIterator<Item = &'v PropertyValue>,
{
    let mut state = AggregatorState::new(aggregation);
    for value in values {
        state.update(value);
    }
    state.result()
}
