// decanter-eval/src/eval/report.rs
//
// Markdown and JSON report output for the evaluation engine.

use serde_json::Value;

use super::{Confusion, EvaluationEngine};

fn print_confusion(title: &str, c: &Confusion) {
    println!("### {}\n", title);
    println!("|               | Malicious      | Benign         |");
    println!("|---------------|----------------|----------------|");
    println!("| Detected      | TP {:<11} | FP {:<11} |", c.tp, c.fp);
    println!("| Not detected  | FN {:<11} | TN {:<11} |", c.fn_, c.tn);
    println!();
    println!(
        "Precision {:.4}  Recall {:.4}  F1 {:.4}  FPR {:.4}\n",
        c.precision(), c.recall(), c.f1(), c.fpr()
    );
}

/// Print the full report to stdout.
pub fn print_markdown(engine: &EvaluationEngine) {
    let s = engine.stats();
    let m = engine.metrics();

    println!("\n# DECANTeR Evaluation Report\n");

    println!("## Fingerprint Stats\n");
    println!("| Bucket        | Fingerprints | Requests   |");
    println!("|---------------|--------------|------------|");
    println!("| Benign        | {:<12} | {:<10} |", s.benign.fingerprints, s.benign.requests);
    println!("| Alerts        | {:<12} | {:<10} |", s.alerts.fingerprints, s.alerts.requests);
    println!("| Unique alerts | {:<12} | {:<10} |", s.unique.fingerprints, s.unique.requests);
    println!();

    println!("## Detection Performance\n");
    print_confusion("Fingerprints", &m.fingerprints);
    print_confusion("Fingerprints (after retraining)", &m.fingerprints_retrained);
    print_confusion("Requests", &m.requests);
    print_confusion("Requests (after retraining)", &m.requests_retrained);

    println!("## Unique Fingerprints: {}\n", engine.unique().len());
    for f in engine.unique() {
        println!("- {}", f);
    }
    println!();
}

fn confusion_json(c: &Confusion) -> Value {
    serde_json::json!({
        "tp":        c.tp,
        "fp":        c.fp,
        "tn":        c.tn,
        "fn":        c.fn_,
        "precision": c.precision(),
        "recall":    c.recall(),
        "f1":        c.f1(),
        "fpr":       c.fpr(),
    })
}

/// Serialize the evaluation result to JSON for downstream consumption.
pub fn to_json(engine: &EvaluationEngine) -> Value {
    let m = engine.metrics();
    serde_json::json!({
        "stats": engine.stats(),
        "fingerprints":           confusion_json(&m.fingerprints),
        "fingerprints_retrained": confusion_json(&m.fingerprints_retrained),
        "requests":               confusion_json(&m.requests),
        "requests_retrained":     confusion_json(&m.requests_retrained),
        "unique": engine.unique().iter().map(|f| f.id.as_str()).collect::<Vec<_>>(),
    })
}
