use super::*;
use crate::preflight::{NonInteractivePrompt, ScriptedPrompt};
use crate::service::ResponseBody;
use serde_json::json;
use std::sync::{Arc, Mutex};

struct RecordingService {
    reply: Result<Value, u16>,
    requests: Arc<Mutex<Vec<ResponseRequest>>>,
}

impl ComputationService for RecordingService {
    fn create_response(&self, request: &ResponseRequest) -> Result<ResponseBody, ServiceError> {
        self.requests
            .lock()
            .expect("requests lock")
            .push(request.clone());
        match &self.reply {
            Ok(value) => Ok(ResponseBody::from_structured(value)),
            Err(status) => Err(ServiceError::Status {
                status: *status,
                body: "overloaded".to_string(),
            }),
        }
    }
}

fn client_with(reply: Result<Value, u16>) -> (PayrollClient, Arc<Mutex<Vec<ResponseRequest>>>) {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let service = RecordingService {
        reply,
        requests: Arc::clone(&requests),
    };
    let settings = ModelSettings {
        model: "gpt-5".to_string(),
        verbosity: "low".to_string(),
        reasoning_effort: "medium".to_string(),
    };
    let schemas = SchemaSet::embedded().expect("embedded schemas compile");
    (
        PayrollClient::new(schemas, Box::new(service), settings),
        requests,
    )
}

fn complete_input() -> Value {
    json!({
        "period": {"year": 2025, "month": 3},
        "region_config": {"ccaa": "Cataluña"},
        "company": {"cnae": "6201"},
        "tables": {"cotization_year": 2025, "irpf_year": 2025},
        "worker": {"nif": "12345678Z", "name": "Ana"},
        "compensation": {"base_salary": 1800.0, "base_salary_cra_code": "C01"}
    })
}

fn valid_result(warnings: Value) -> Value {
    json!({
        "period": {"year": 2025, "month": 3},
        "worker": {"nif": "12345678Z", "name": "Ana"},
        "irpf_regime": "AEAT",
        "earnings": [
            {"concept": "Salario base", "cra_code": "C01", "amount": 1800.0, "taxable": true, "contributory": true}
        ],
        "contribution_bases": {"common": 1800.0, "professional": 1800.0, "unemployment": 1800.0},
        "worker_contributions": [{"concept": "Contingencias comunes", "rate_pct": 4.7, "amount": 84.6}],
        "employer_contributions": [{"concept": "Contingencias comunes", "rate_pct": 23.6, "amount": 424.8}],
        "irpf": {"base": 1800.0, "rate_pct": 12.0, "amount": 216.0},
        "totals": {"gross": 1800.0, "deductions": 300.6, "net": 1499.4, "employer_cost": 2224.8},
        "trace": ["base salary taken from input"],
        "warnings": warnings
    })
}

#[test]
fn complete_input_goes_straight_to_the_model() {
    let (client, requests) = client_with(Ok(valid_result(json!([]))));
    let output = client
        .compute(&complete_input(), MissingPolicy::Fail, &mut NonInteractivePrompt)
        .expect("compute");
    assert_eq!(output["warnings"], json!([]));
    assert_eq!(output["totals"]["net"], json!(1499.4));

    let requests = requests.lock().expect("requests lock");
    assert_eq!(requests.len(), 1);
    let sent = serde_json::to_value(&requests[0]).expect("serialize request");
    let user_text = sent["input"][1]["content"].as_str().expect("user content");
    let sent_doc: Value = serde_json::from_str(user_text).expect("user content is JSON");
    assert_eq!(sent_doc["region_config"]["irpf_regime"], json!("AEAT"));
    assert_eq!(sent_doc["region_config"]["notes"], json!(""));
}

#[test]
fn default_warnings_are_appended_after_model_warnings() {
    let (client, _) = client_with(Ok(valid_result(json!(["model note"]))));
    let mut input = complete_input();
    input["worker"]
        .as_object_mut()
        .expect("worker object")
        .remove("nif");
    let output = client
        .compute(&input, MissingPolicy::Default, &mut NonInteractivePrompt)
        .expect("compute");
    assert_eq!(
        output["warnings"],
        json!(["model note", "default applied at worker.nif: NO-INFORMADO"])
    );
}

#[test]
fn fail_policy_stops_before_the_service() {
    let (client, requests) = client_with(Ok(valid_result(json!([]))));
    let mut input = complete_input();
    input["tables"] = json!({});
    let err = client
        .compute(&input, MissingPolicy::Fail, &mut NonInteractivePrompt)
        .expect_err("missing tables");
    assert!(matches!(err, PipelineError::Preflight(_)), "{err}");
    let message = err.to_string();
    assert!(message.contains("tables.cotization_year"), "{message}");
    assert!(message.contains("tables.irpf_year"), "{message}");
    assert!(requests.lock().expect("requests lock").is_empty());
}

#[test]
fn invalid_input_is_a_schema_error() {
    let (client, requests) = client_with(Ok(valid_result(json!([]))));
    let mut input = complete_input();
    input["period"]["year"] = json!("2025");
    let err = client
        .compute(&input, MissingPolicy::Default, &mut NonInteractivePrompt)
        .expect_err("string year");
    assert!(matches!(err, PipelineError::Schema(_)), "{err}");
    assert!(err.to_string().contains("PayrollInputSchema"), "{err}");
    assert!(requests.lock().expect("requests lock").is_empty());
}

#[test]
fn output_schema_violations_are_reported() {
    let mut result = valid_result(json!([]));
    result["unexpected"] = json!(true);
    let (client, _) = client_with(Ok(result));
    let err = client
        .compute(&complete_input(), MissingPolicy::Fail, &mut NonInteractivePrompt)
        .expect_err("extra field");
    assert!(err.to_string().contains("PayrollResultSchema"), "{err}");
}

#[test]
fn service_failures_surface_with_status() {
    let (client, _) = client_with(Err(503));
    let err = client
        .compute(&complete_input(), MissingPolicy::Fail, &mut NonInteractivePrompt)
        .expect_err("service down");
    assert!(matches!(err, PipelineError::Service(ServiceError::Status { status: 503, .. })));
}

#[test]
fn preflight_with_scripted_answers() {
    let schemas = SchemaSet::embedded().expect("embedded schemas compile");
    let mut input = complete_input();
    input["region_config"] = json!({"ccaa": "Atlantis"});
    let mut prompt = ScriptedPrompt::new(["FORAL_PV"]);
    let preflight =
        run_preflight(&schemas, &input, MissingPolicy::Ask, &mut prompt).expect("preflight");
    assert_eq!(preflight.missing.len(), 1);
    assert_eq!(preflight.missing[0].path, "region_config.irpf_regime");
    assert_eq!(
        preflight.document["region_config"]["irpf_regime"],
        json!("FORAL_PV")
    );
    assert!(preflight.warnings.is_empty());
}

#[test]
fn append_warnings_creates_missing_array() {
    let mut output = json!({"totals": {}});
    append_warnings(&mut output, vec!["w".to_string()]);
    assert_eq!(output["warnings"], json!(["w"]));

    let mut output = json!({"warnings": "oops"});
    append_warnings(&mut output, vec!["w".to_string()]);
    assert_eq!(output["warnings"], json!("oops"));
}

#[test]
fn client_preflight_does_not_call_the_service() {
    let (client, requests) = client_with(Err(500));
    let mut input = complete_input();
    input["company"] = json!({});
    let preflight = client
        .preflight(&input, MissingPolicy::Default, &mut NonInteractivePrompt)
        .expect("preflight");
    assert_eq!(preflight.document["company"]["atep_tariff_pct"], json!(1.5));
    assert_eq!(
        preflight.warnings,
        vec!["default applied at company.atep_tariff_pct: 1.5".to_string()]
    );
    assert!(requests.lock().expect("requests lock").is_empty());
}

#[test]
fn preflight_serializes_document_and_warnings_only() {
    let schemas = SchemaSet::embedded().expect("embedded schemas compile");
    let mut input = complete_input();
    input["worker"] = json!({"name": "Ana"});
    let preflight = run_preflight(
        &schemas,
        &input,
        MissingPolicy::Default,
        &mut NonInteractivePrompt,
    )
    .expect("preflight");
    assert_eq!(preflight.missing.len(), 1);

    let wire = serde_json::to_value(&preflight).expect("serialize preflight");
    let keys: Vec<&String> = wire.as_object().expect("object").keys().collect();
    assert_eq!(keys, ["document", "warnings"]);
    assert_eq!(wire["document"]["worker"]["nif"], json!("NO-INFORMADO"));
    assert_eq!(
        wire["warnings"],
        json!(["default applied at worker.nif: NO-INFORMADO"])
    );
}
