use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use crate::types::{CellValue, Endpoint, Record};

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("table not found")]
    TableNotFound,
    #[error("table header not found")]
    MissingHeader,
    #[error("table body not found")]
    MissingBody,
}

const CATEGORY_CLASS: &str = "tb_item";
const PRODUCT_COLUMN: &str = "Produto";
const LITRES_COLUMN: &str = "Quantidade (L.)";
const KILOGRAMS_COLUMN: &str = "Quantidade (Kg)";

static SEL_TABLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table.tb_base.tb_dados").expect("invalid selector: table"));
static SEL_THEAD: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("thead").expect("invalid selector: thead"));
static SEL_TH: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("th").expect("invalid selector: th"));
static SEL_TBODY: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tbody").expect("invalid selector: tbody"));
static SEL_TR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tr").expect("invalid selector: tr"));
static SEL_TD: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td").expect("invalid selector: td"));

/// The shape of a body row, decided before any normalization happens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowKind {
    Category(String),
    Data(Vec<String>),
    Unrecognized,
}

fn elem_text(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn find_table(document: &Html) -> Result<ElementRef<'_>, ParseError> {
    document
        .select(&SEL_TABLE)
        .next()
        .ok_or(ParseError::TableNotFound)
}

fn read_header(table: ElementRef) -> Result<Vec<String>, ParseError> {
    let thead = table
        .select(&SEL_THEAD)
        .next()
        .ok_or(ParseError::MissingHeader)?;
    let header: Vec<String> = thead.select(&SEL_TH).map(elem_text).collect();
    if header.is_empty() {
        return Err(ParseError::MissingHeader);
    }
    Ok(header)
}

pub fn classify_row(row: ElementRef, header_len: usize) -> RowKind {
    let cells: Vec<ElementRef> = row.select(&SEL_TD).collect();

    if let [cell] = cells.as_slice()
        && cell.value().classes().any(|c| c == CATEGORY_CLASS)
    {
        return RowKind::Category(elem_text(*cell));
    }

    if cells.len() == header_len {
        RowKind::Data(cells.into_iter().map(elem_text).collect())
    } else {
        RowKind::Unrecognized
    }
}

/// Builds a record from one data row. Returns `None` when any value ends up
/// `Null`, the row is then dropped entirely.
pub fn normalize_row(
    header: &[String],
    cells: &[String],
    endpoint: Endpoint,
    category: Option<&str>,
    year: i32,
) -> Option<Record> {
    let mut record = Record::new();
    for (name, text) in header.iter().zip(cells) {
        record.insert(name.as_str(), CellValue::from_cell_text(text));
    }

    if endpoint.renames_product()
        && let Some(product) = record.remove(PRODUCT_COLUMN)
    {
        record.insert(Record::ITEM, product);
    }

    if record.contains(LITRES_COLUMN) {
        record.insert(Record::UNIT, CellValue::Text("L".to_string()));
    } else if record.contains(KILOGRAMS_COLUMN) {
        record.insert(Record::UNIT, CellValue::Text("Kg".to_string()));
    }

    if let Some(category) = category.filter(|c| !c.is_empty()) {
        record.insert(Record::CATEGORY, CellValue::Text(category.to_string()));
    }
    record.insert(Record::YEAR, CellValue::Integer(i64::from(year)));

    record.is_complete().then_some(record)
}

/// Extracts every complete record from one yearly page. `Ok(None)` means the
/// table is there but nothing in it qualified for `year`.
pub fn parse_year_page(
    html: &str,
    endpoint: Endpoint,
    year: i32,
) -> Result<Option<Vec<Record>>, ParseError> {
    let document = Html::parse_document(html);
    let table = find_table(&document)?;
    let header = read_header(table)?;
    let tbody = table
        .select(&SEL_TBODY)
        .next()
        .ok_or(ParseError::MissingBody)?;

    let mut records = Vec::new();
    let mut current_category: Option<String> = None;
    let mut dropped = 0usize;

    for row in tbody.select(&SEL_TR) {
        match classify_row(row, header.len()) {
            RowKind::Category(text) => current_category = Some(text),
            RowKind::Data(cells) => {
                match normalize_row(
                    &header,
                    &cells,
                    endpoint,
                    current_category.as_deref(),
                    year,
                ) {
                    Some(record) => records.push(record),
                    None => {
                        log::trace!("Dropping incomplete row {cells:?}");
                        dropped += 1;
                    }
                }
            }
            RowKind::Unrecognized => {}
        }
    }

    log::debug!(
        "{endpoint} {year}: {} record(s), {dropped} incomplete row(s) dropped",
        records.len()
    );

    if records.is_empty() {
        return Ok(None);
    }
    Ok(Some(records))
}
