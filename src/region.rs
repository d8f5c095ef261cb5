//! Region enrichment: derive the IRPF regime from the CCAA.
use serde_json::Value;
use std::fmt;

/// Withholding jurisdiction that decides which IRPF rule set applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrpfRegime {
    Aeat,
    ForalNavarra,
    ForalPv,
}

impl IrpfRegime {
    pub const ALL: [IrpfRegime; 3] = [
        IrpfRegime::Aeat,
        IrpfRegime::ForalNavarra,
        IrpfRegime::ForalPv,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            IrpfRegime::Aeat => "AEAT",
            IrpfRegime::ForalNavarra => "FORAL_NAVARRA",
            IrpfRegime::ForalPv => "FORAL_PV",
        }
    }
}

impl fmt::Display for IrpfRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// CCAA name to IRPF regime. Everything outside the two foral regions
/// withholds under the state agency.
const CCAA_REGIMES: [(&str, IrpfRegime); 19] = [
    ("Andalucía", IrpfRegime::Aeat),
    ("Aragón", IrpfRegime::Aeat),
    ("Principado de Asturias", IrpfRegime::Aeat),
    ("Illes Balears", IrpfRegime::Aeat),
    ("Canarias", IrpfRegime::Aeat),
    ("Cantabria", IrpfRegime::Aeat),
    ("Castilla-La Mancha", IrpfRegime::Aeat),
    ("Castilla y León", IrpfRegime::Aeat),
    ("Cataluña", IrpfRegime::Aeat),
    ("Comunitat Valenciana", IrpfRegime::Aeat),
    ("Extremadura", IrpfRegime::Aeat),
    ("Galicia", IrpfRegime::Aeat),
    ("Comunidad de Madrid", IrpfRegime::Aeat),
    ("Región de Murcia", IrpfRegime::Aeat),
    ("La Rioja", IrpfRegime::Aeat),
    ("Comunidad Foral de Navarra", IrpfRegime::ForalNavarra),
    ("País Vasco", IrpfRegime::ForalPv),
    ("Ceuta", IrpfRegime::Aeat),
    ("Melilla", IrpfRegime::Aeat),
];

/// Look up the regime for an exact CCAA name.
pub fn regime_for_ccaa(ccaa: &str) -> Option<IrpfRegime> {
    CCAA_REGIMES
        .iter()
        .find(|(name, _)| *name == ccaa)
        .map(|(_, regime)| *regime)
}

/// Fill `region_config.irpf_regime` from the CCAA table on a copy of `input`.
///
/// An explicit `irpf_regime` is never replaced. `notes` defaults to an empty
/// string whenever a CCAA is present.
pub fn enrich_region_config(input: &Value) -> Value {
    let mut doc = input.clone();
    let Some(ccaa) = doc
        .get("region_config")
        .and_then(|rc| rc.get("ccaa"))
        .and_then(Value::as_str)
        .filter(|ccaa| !ccaa.is_empty())
        .map(str::to_string)
    else {
        return doc;
    };

    let Some(region_config) = doc.get_mut("region_config").and_then(Value::as_object_mut) else {
        return doc;
    };
    region_config
        .entry("notes")
        .or_insert_with(|| Value::String(String::new()));
    if !region_config.contains_key("irpf_regime") {
        if let Some(regime) = regime_for_ccaa(&ccaa) {
            tracing::debug!(ccaa = %ccaa, regime = %regime, "derived irpf regime");
            region_config.insert(
                "irpf_regime".to_string(),
                Value::String(regime.as_str().to_string()),
            );
        }
    }
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn pais_vasco_maps_to_foral_pv() {
        let input = json!({"region_config": {"ccaa": "País Vasco"}});
        let enriched = enrich_region_config(&input);
        assert_eq!(enriched["region_config"]["irpf_regime"], json!("FORAL_PV"));
        assert_eq!(enriched["region_config"]["notes"], json!(""));
    }

    #[test]
    fn navarra_and_common_regions() {
        assert_eq!(
            regime_for_ccaa("Comunidad Foral de Navarra"),
            Some(IrpfRegime::ForalNavarra)
        );
        assert_eq!(regime_for_ccaa("Cataluña"), Some(IrpfRegime::Aeat));
        assert_eq!(regime_for_ccaa("cataluña"), None);
    }

    #[test]
    fn explicit_regime_is_kept() {
        let input = json!({"region_config": {"ccaa": "País Vasco", "irpf_regime": "AEAT", "notes": "x"}});
        let enriched = enrich_region_config(&input);
        assert_eq!(enriched, input);
    }

    #[test]
    fn enrichment_is_idempotent() {
        let input = json!({"region_config": {"ccaa": "Comunidad Foral de Navarra"}});
        let once = enrich_region_config(&input);
        let twice = enrich_region_config(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn missing_ccaa_returns_copy_unchanged() {
        let input = json!({"period": {"year": 2025}});
        assert_eq!(enrich_region_config(&input), input);

        let input = json!({"region_config": {"ccaa": ""}});
        assert_eq!(enrich_region_config(&input), input);
    }

    #[test]
    fn unknown_ccaa_only_gets_notes() {
        let input = json!({"region_config": {"ccaa": "Atlantis"}});
        let enriched = enrich_region_config(&input);
        assert_eq!(enriched, json!({"region_config": {"ccaa": "Atlantis", "notes": ""}}));
    }

    #[test]
    fn caller_document_is_not_mutated() {
        let input = json!({"region_config": {"ccaa": "Galicia"}});
        let before = input.clone();
        let _ = enrich_region_config(&input);
        assert_eq!(input, before);
    }
}
