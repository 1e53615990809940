//! JSON encoding for `f64` values that may be NaN or infinite.
//!
//! JSON has no literal for non-finite numbers and `serde_json` writes them as
//! `null`, which cannot be read back as `f64`. Finite values are written as
//! plain numbers; NaN and ±inf are written as the strings `"NaN"`, `"inf"`
//! and `"-inf"`. Both forms are accepted on input.

use serde::{Deserialize, Serialize, Serializer};

struct Out(f64);

impl Serialize for Out {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0.is_finite() {
            serializer.serialize_f64(self.0)
        } else {
            serializer.collect_str(&self.0)
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum In {
    Number(f64),
    Text(String),
}

impl In {
    fn into_f64(self) -> Result<f64, String> {
        match self {
            In::Number(v) => Ok(v),
            In::Text(s) => match s.as_str() {
                "NaN" => Ok(f64::NAN),
                "inf" => Ok(f64::INFINITY),
                "-inf" => Ok(f64::NEG_INFINITY),
                _ => Err(format!("expected a number, \"NaN\", \"inf\" or \"-inf\", got {:?}", s)),
            },
        }
    }
}

/// `#[serde(with)]` adapter for `Vec<f64>`.
pub mod flat {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{In, Out};

    pub fn serialize<S: Serializer>(values: &[f64], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(values.iter().map(|&v| Out(v)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<f64>, D::Error> {
        Vec::<In>::deserialize(deserializer)?
            .into_iter()
            .map(In::into_f64)
            .collect::<Result<_, _>>()
            .map_err(D::Error::custom)
    }
}

/// `#[serde(with)]` adapter for `Vec<Vec<f64>>`.
pub mod nested {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::{flat, In};

    struct Row<'a>(&'a [f64]);

    impl Serialize for Row<'_> {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            flat::serialize(self.0, serializer)
        }
    }

    pub fn serialize<S: Serializer>(rows: &[Vec<f64>], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(rows.iter().map(|row| Row(row)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Vec<f64>>, D::Error> {
        Vec::<Vec<In>>::deserialize(deserializer)?
            .into_iter()
            .map(|row| row.into_iter().map(In::into_f64).collect::<Result<Vec<_>, _>>())
            .collect::<Result<_, _>>()
            .map_err(D::Error::custom)
    }
}
