//! Two-variable constrained test functions.

use std::fmt;

use clap::ValueEnum;
use elites::Relation;
use serde::{Deserialize, Serialize};

type Expression = fn(&[f64]) -> f64;

/// One constraint `measure <relation> target`.
#[derive(Clone, Copy)]
pub struct Constraint {
    pub name: &'static str,
    pub measure: Expression,
    pub target: Expression,
    pub relation: Relation,
}

impl fmt::Debug for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constraint")
            .field("name", &self.name)
            .field("relation", &self.relation)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum Benchmark {
    RosenbrockCubicLine,
    RosenbrockDisk,
    MishraBird,
    Townsend,
    Simionescu,
}

impl Benchmark {
    pub fn evaluate(self, x: &[f64]) -> f64 {
        let (a, b) = (x[0], x[1]);
        match self {
            Benchmark::RosenbrockCubicLine | Benchmark::RosenbrockDisk => rosenbrock(a, b),
            Benchmark::MishraBird => {
                b.sin() * ((1.0 - a.cos()).powi(2)).exp() + a.cos() * ((1.0 - b.sin()).powi(2)).exp() + (a - b).powi(2)
            }
            Benchmark::Townsend => -((a - 0.1) * b).cos().powi(2) - a * (3.0 * a + b).sin(),
            Benchmark::Simionescu => 0.1 * a * b,
        }
    }

    /// Search domain as `(low, high)` per variable.
    pub fn bounds(self) -> [(f64, f64); 2] {
        match self {
            Benchmark::RosenbrockCubicLine => [(-1.5, 1.5), (-0.5, 2.5)],
            Benchmark::RosenbrockDisk => [(-1.5, 1.5), (-1.5, 1.5)],
            Benchmark::MishraBird => [(-10.0, 0.0), (-6.5, 0.0)],
            Benchmark::Townsend => [(-2.25, 2.25), (-2.5, 1.75)],
            Benchmark::Simionescu => [(-1.25, 1.25), (-1.25, 1.25)],
        }
    }

    pub fn constraints(self) -> Vec<Constraint> {
        match self {
            Benchmark::RosenbrockCubicLine => vec![
                Constraint {
                    name: "(x-1)^3 - y + 1 <= 0",
                    measure: |x| (x[0] - 1.0).powi(3) - x[1] + 1.0,
                    target: |_| 0.0,
                    relation: Relation::LessOrEqual,
                },
                Constraint {
                    name: "x + y - 2 <= 0",
                    measure: |x| x[0] + x[1] - 2.0,
                    target: |_| 0.0,
                    relation: Relation::LessOrEqual,
                },
            ],
            Benchmark::RosenbrockDisk => vec![Constraint {
                name: "x^2 + y^2 <= 2",
                measure: squared_radius,
                target: |_| 2.0,
                relation: Relation::LessOrEqual,
            }],
            Benchmark::MishraBird => vec![Constraint {
                name: "(x+5)^2 + (y+5)^2 < 25",
                measure: |x| (x[0] + 5.0).powi(2) + (x[1] + 5.0).powi(2),
                target: |_| 25.0,
                relation: Relation::Less,
            }],
            Benchmark::Townsend => vec![Constraint {
                name: "x^2 + y^2 < r(t)^2",
                measure: squared_radius,
                target: townsend_radius,
                relation: Relation::Less,
            }],
            Benchmark::Simionescu => vec![Constraint {
                name: "x^2 + y^2 <= (1 + 0.2cos(8t))^2",
                measure: squared_radius,
                target: |x| (1.0 + 0.2 * (8.0 * x[0].atan2(x[1])).cos()).powi(2),
                relation: Relation::LessOrEqual,
            }],
        }
    }
}

impl fmt::Display for Benchmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Benchmark::RosenbrockCubicLine => "rosenbrock_cubic_line",
            Benchmark::RosenbrockDisk => "rosenbrock_disk",
            Benchmark::MishraBird => "mishra_bird",
            Benchmark::Townsend => "townsend",
            Benchmark::Simionescu => "simionescu",
        };
        f.write_str(name)
    }
}

fn rosenbrock(x: f64, y: f64) -> f64 {
    (1.0 - x).powi(2) + 100.0 * (y - x.powi(2)).powi(2)
}

fn squared_radius(x: &[f64]) -> f64 {
    x[0].powi(2) + x[1].powi(2)
}

fn townsend_radius(x: &[f64]) -> f64 {
    let t = x[0].atan2(x[1]);
    let r = 2.0 * t.cos() - 0.5 * (2.0 * t).cos() - 0.25 * (3.0 * t).cos() - 0.125 * (4.0 * t).cos();
    r.powi(2) + (2.0 * t.sin()).powi(2)
}
