//! Missing-field detection.
//!
//! Rules run in a fixed order and the gap list keeps that order, since it is
//! also the order operators are prompted in.
use super::types::{FieldKind, MissingField};
use crate::document::{display_value, ensure_object, get_path, is_blank};
use crate::region::IrpfRegime;
use serde_json::Value;

/// Allowance label that needs a matching variable-pay amount.
pub const PLUS_CONVENIO_LABEL: &str = "Plus Convenio";
/// Synthetic path for the allowance amount; the resolver routes it into
/// `compensation.variables` instead of writing it literally.
pub const PLUS_CONVENIO_AMOUNT_PATH: &str = "compensation.plus_convenio_amount";
/// CRA code stamped on a variable item created for the allowance.
pub const PLUS_CONVENIO_CRA_CODE: &str = "C02";
/// AT/EP tariff used when the company has neither CNAE nor tariff.
pub const DEFAULT_ATEP_TARIFF_PCT: f64 = 1.50;
pub const DEFAULT_BASE_SALARY_CRA_CODE: &str = "C01";
pub const DEFAULT_WORKER_NIF: &str = "NO-INFORMADO";

/// True for a pay item named like the collective-agreement allowance,
/// ignoring case.
pub fn is_plus_convenio(item: &Value) -> bool {
    item.get("name")
        .and_then(Value::as_str)
        .is_some_and(|name| name.to_lowercase() == PLUS_CONVENIO_LABEL.to_lowercase())
}

/// Evaluate every rule against an enriched document.
///
/// Creates empty `company` and `tables` objects when absent so the resolver
/// can write into them; nothing else is modified.
pub fn detect_missing(doc: &mut Value) -> Vec<MissingField> {
    let mut missing = Vec::new();

    missing.extend(missing_plus_convenio_amount(doc));

    ensure_object(doc, "company");
    missing.extend(missing_atep_tariff(doc));

    let period_year = get_path(doc, "period.year")
        .filter(|year| !year.is_null())
        .cloned();
    ensure_object(doc, "tables");
    missing.extend(missing_table_year(
        doc,
        "tables.cotization_year",
        "¿Año de tablas de cotización a aplicar?",
        "Normalmente coincide con el año del período.",
        period_year.as_ref(),
    ));
    missing.extend(missing_table_year(
        doc,
        "tables.irpf_year",
        "¿Año de tablas IRPF a aplicar?",
        "AEAT o forales del ejercicio.",
        period_year.as_ref(),
    ));

    missing.extend(missing_base_salary_code(doc));
    missing.extend(missing_worker_nif(doc));
    missing.extend(missing_irpf_regime(doc));

    for field in &missing {
        tracing::debug!(path = %field.path, "missing field");
    }
    missing
}

fn missing_plus_convenio_amount(doc: &Value) -> Option<MissingField> {
    let declared = has_labelled_item(doc, "collective_agreement.allowances");
    let priced = has_labelled_item(doc, "compensation.variables");
    if !declared || priced {
        return None;
    }
    Some(MissingField {
        path: PLUS_CONVENIO_AMOUNT_PATH.to_string(),
        question: format!("¿Importe mensual del '{PLUS_CONVENIO_LABEL}' (€)?"),
        hint: "Introduce la cuantía bruta mensual.".to_string(),
        kind: FieldKind::Number,
        options: None,
        default: Some(Value::from(0.0)),
    })
}

fn has_labelled_item(doc: &Value, path: &str) -> bool {
    get_path(doc, path)
        .and_then(Value::as_array)
        .is_some_and(|items| items.iter().any(is_plus_convenio))
}

fn missing_atep_tariff(doc: &Value) -> Option<MissingField> {
    if !is_blank(get_path(doc, "company.cnae"))
        || !is_blank(get_path(doc, "company.atep_tariff_pct"))
    {
        return None;
    }
    Some(MissingField {
        path: "company.atep_tariff_pct".to_string(),
        question: "Sin CNAE: indica tarifa AT/EP (%) p.ej. 1.50".to_string(),
        hint: "Si conoces el CNAE, mejor añádelo y deja vacío aquí.".to_string(),
        kind: FieldKind::Number,
        options: None,
        default: Some(Value::from(DEFAULT_ATEP_TARIFF_PCT)),
    })
}

fn missing_table_year(
    doc: &Value,
    path: &str,
    question: &str,
    hint: &str,
    period_year: Option<&Value>,
) -> Option<MissingField> {
    if !is_blank(get_path(doc, path)) {
        return None;
    }
    let example = period_year.map_or_else(|| "?".to_string(), display_value);
    Some(MissingField {
        path: path.to_string(),
        question: format!("{question} (p.ej. {example})"),
        hint: hint.to_string(),
        kind: FieldKind::Number,
        options: None,
        default: period_year.cloned(),
    })
}

fn missing_base_salary_code(doc: &Value) -> Option<MissingField> {
    if !is_blank(get_path(doc, "compensation.base_salary_cra_code")) {
        return None;
    }
    Some(MissingField {
        path: "compensation.base_salary_cra_code".to_string(),
        question: format!("Código CRA para salario base (p.ej. {DEFAULT_BASE_SALARY_CRA_CODE}):"),
        hint: format!("Si no sabes, usa {DEFAULT_BASE_SALARY_CRA_CODE}."),
        kind: FieldKind::String,
        options: None,
        default: Some(Value::from(DEFAULT_BASE_SALARY_CRA_CODE)),
    })
}

fn missing_worker_nif(doc: &Value) -> Option<MissingField> {
    if !is_blank(get_path(doc, "worker.nif")) {
        return None;
    }
    Some(MissingField {
        path: "worker.nif".to_string(),
        question: "NIF del trabajador (formato 12345678Z). Déjalo vacío si no aplica:"
            .to_string(),
        hint: "No afecta al cálculo pero sí a trazabilidad.".to_string(),
        kind: FieldKind::String,
        options: None,
        default: Some(Value::from(DEFAULT_WORKER_NIF)),
    })
}

fn missing_irpf_regime(doc: &Value) -> Option<MissingField> {
    if !is_blank(get_path(doc, "region_config.irpf_regime")) {
        return None;
    }
    let options: Vec<String> = IrpfRegime::ALL
        .iter()
        .map(|regime| regime.as_str().to_string())
        .collect();
    Some(MissingField {
        path: "region_config.irpf_regime".to_string(),
        question: format!("Régimen IRPF ({}):", options.join(" | ")),
        hint: "Por Cataluña: AEAT.".to_string(),
        kind: FieldKind::Enum,
        options: Some(options),
        default: Some(Value::from(IrpfRegime::Aeat.as_str())),
    })
}

#[cfg(test)]
#[path = "detect_tests.rs"]
mod tests;
