use std::collections::BTreeMap;
use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
#[error("Invalid endpoint '{0}'. Accepted values: 'producao', 'processamento', 'comercializacao', 'importacao', 'exportacao'")]
pub struct EndpointParseError(pub String);

/// A topic published by VitiBrasil, one per `opcao` page on the site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Endpoint {
    Producao,
    Processamento,
    Comercializacao,
    Importacao,
    Exportacao,
}

impl Endpoint {
    pub const ALL: [Endpoint; 5] = [
        Endpoint::Producao,
        Endpoint::Processamento,
        Endpoint::Comercializacao,
        Endpoint::Importacao,
        Endpoint::Exportacao,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            Endpoint::Producao => "producao",
            Endpoint::Processamento => "processamento",
            Endpoint::Comercializacao => "comercializacao",
            Endpoint::Importacao => "importacao",
            Endpoint::Exportacao => "exportacao",
        }
    }

    /// Site option code, the value of the `opcao` query parameter.
    pub fn option(&self) -> &'static str {
        match self {
            Endpoint::Producao => "opt_02",
            Endpoint::Processamento => "opt_03",
            Endpoint::Comercializacao => "opt_04",
            Endpoint::Importacao => "opt_05",
            Endpoint::Exportacao => "opt_06",
        }
    }

    pub fn query(&self) -> String {
        format!("opcao={}", self.option())
    }

    pub fn from_option(option: &str) -> Option<Endpoint> {
        Self::ALL.into_iter().find(|e| e.option() == option)
    }

    /// Whether the "Produto" column is published as `item` for this topic.
    pub fn renames_product(&self) -> bool {
        matches!(self, Endpoint::Producao | Endpoint::Comercializacao)
    }

    pub fn description(&self) -> &'static str {
        match self {
            Endpoint::Producao => "Production of wines, juices and derivatives",
            Endpoint::Processamento => "Quantity of grapes processed",
            Endpoint::Comercializacao => "Commercialization of wines and derivatives",
            Endpoint::Importacao => "Imports of viticulture derivatives",
            Endpoint::Exportacao => "Exports of viticulture derivatives",
        }
    }
}

impl FromStr for Endpoint {
    type Err = EndpointParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|e| e.slug() == s)
            .ok_or_else(|| EndpointParseError(s.to_string()))
    }
}

impl Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.slug())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Integer(i64),
    Text(String),
    Null,
}

impl CellValue {
    /// Cleans raw cell text: trims, drops thousands separators and maps the
    /// "-" placeholder to `Null`. Anything that is not an integer stays text.
    pub fn from_cell_text(raw: &str) -> CellValue {
        let cleaned = raw.trim().replace('.', "");
        if cleaned == "-" {
            return CellValue::Null;
        }
        match cleaned.parse::<i64>() {
            Ok(n) => CellValue::Integer(n),
            Err(_) => CellValue::Text(cleaned),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            CellValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Integer(n) => write!(f, "{n}"),
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Null => write!(f, "-"),
        }
    }
}

/// One normalized table row. Keys are the column headers plus the derived
/// `item`, `unit`, `category` and `year` fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(BTreeMap<String, CellValue>);

impl Record {
    pub const ITEM: &'static str = "item";
    pub const UNIT: &'static str = "unit";
    pub const CATEGORY: &'static str = "category";
    pub const YEAR: &'static str = "year";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &str) -> Option<&CellValue> {
        self.0.get(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: CellValue) -> Option<CellValue> {
        self.0.insert(field.into(), value)
    }

    pub fn remove(&mut self, field: &str) -> Option<CellValue> {
        self.0.remove(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// True when no field holds `Null`; only complete records are published.
    pub fn is_complete(&self) -> bool {
        !self.0.values().any(CellValue::is_null)
    }

    pub fn year(&self) -> Option<i64> {
        self.get(Self::YEAR).and_then(CellValue::as_integer)
    }

    pub fn category(&self) -> Option<&str> {
        self.get(Self::CATEGORY).and_then(CellValue::as_text)
    }

    pub fn unit(&self) -> Option<&str> {
        self.get(Self::UNIT).and_then(CellValue::as_text)
    }
}

impl Display for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.year() {
            Some(year) => write!(f, "[{year}]")?,
            None => write!(f, "[----]")?,
        }
        if let Some(category) = self.category() {
            write!(f, " {category} ·")?;
        }
        let rest = self
            .fields()
            .filter(|(k, _)| ![Self::YEAR, Self::CATEGORY].contains(k))
            .map(|(k, v)| format!("{k}: {v}"))
            .collect::<Vec<_>>()
            .join(" · ");
        write!(f, " {rest}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_from_str() {
        assert_eq!("producao".parse::<Endpoint>().unwrap(), Endpoint::Producao);
        assert_eq!(
            "exportacao".parse::<Endpoint>().unwrap(),
            Endpoint::Exportacao
        );
        let err = "foo".parse::<Endpoint>().unwrap_err();
        assert!(err.to_string().starts_with("Invalid endpoint 'foo'"));
    }

    #[test]
    fn test_endpoint_query_and_option_lookup() {
        assert_eq!(Endpoint::Producao.query(), "opcao=opt_02");
        assert_eq!(Endpoint::Exportacao.query(), "opcao=opt_06");
        for endpoint in Endpoint::ALL {
            assert_eq!(Endpoint::from_option(endpoint.option()), Some(endpoint));
        }
        assert_eq!(Endpoint::from_option("opt_07"), None);
    }

    #[test]
    fn test_renames_product_only_for_production_and_trade() {
        let renaming: Vec<_> = Endpoint::ALL
            .into_iter()
            .filter(Endpoint::renames_product)
            .collect();
        assert_eq!(renaming, vec![Endpoint::Producao, Endpoint::Comercializacao]);
    }

    #[test]
    fn test_cell_value_cleaning() {
        assert_eq!(CellValue::from_cell_text(" 12.345 "), CellValue::Integer(12345));
        assert_eq!(CellValue::from_cell_text("1.234.567"), CellValue::Integer(1234567));
        assert_eq!(CellValue::from_cell_text("-"), CellValue::Null);
        assert_eq!(CellValue::from_cell_text(" - "), CellValue::Null);
        assert_eq!(
            CellValue::from_cell_text("Tinto"),
            CellValue::Text("Tinto".to_string())
        );
        assert_eq!(
            CellValue::from_cell_text("Países Baixos"),
            CellValue::Text("Países Baixos".to_string())
        );
    }

    #[test]
    fn test_record_serializes_as_flat_sorted_object() {
        let mut record = Record::new();
        record.insert("year", CellValue::Integer(2023));
        record.insert("item", CellValue::Text("Tinto".into()));
        record.insert("Quantidade (L.)", CellValue::Integer(139320884));
        record.insert("unit", CellValue::Text("L".into()));

        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"Quantidade (L.)":139320884,"item":"Tinto","unit":"L","year":2023}"#
        );

        let back: Record = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_record_completeness() {
        let mut record = Record::new();
        record.insert("Países", CellValue::Text("Chile".into()));
        assert!(record.is_complete());
        record.insert("Valor (US$)", CellValue::Null);
        assert!(!record.is_complete());
        assert_eq!(serde_json::to_string(&CellValue::Null).unwrap(), "null");
    }
}
