//! Run report tests: state machine and JSON shape.

use chainable::{args, Chain, Fault, Function, RunState};

fn numeric_chain() -> Chain {
    Chain::new()
        .named("numeric")
        .from(args![4])
        .chain([
            Function::new(|x: i32| x + 2).named("add_two"),
            Function::multi(|x: i32| {
                if x > 5 {
                    (x, Some(Fault::msg("too big")))
                } else {
                    (x, None)
                }
            })
            .named("guard"),
            Function::new(|x: i32| x * 2).named("double"),
        ])
}

#[test]
fn test_report_for_failed_run() {
    let (result, report) = numeric_chain().unwrap_traced();

    let err = result.unwrap_err();
    assert_eq!(err.to_string(), "too big");
    assert_eq!(report.state, RunState::Failed { link_index: 1 });
    assert_eq!(report.pipeline_id, "add_two→guard→double");
    assert_eq!(report.links.len(), 2);
    assert!(!report.links[0].failed);
    assert!(report.links[1].failed);
    assert_eq!(report.links[1].n_outputs, 1);
}

#[test]
fn test_report_json() {
    let (_, report) = numeric_chain().unwrap_traced();
    let value: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();

    assert_eq!(value["chain"], "numeric");
    assert_eq!(value["state"]["state"], "failed");
    assert_eq!(value["state"]["link_index"], 1);
    assert_eq!(value["links"][0]["name"], "add_two");
    assert_eq!(value["links"][0]["handle_error"], true);
    assert!(value["started_at"].is_string());
}

#[test]
fn test_each_run_gets_its_own_id() {
    let chain = numeric_chain().reset().from(args![1]).chain([Function::new(|x: i32| x)]);

    let (first, a) = chain.unwrap_traced();
    let (second, b) = chain.unwrap_traced();

    assert_eq!(first.unwrap()[0].get::<i32>(), Some(1));
    assert_eq!(second.unwrap()[0].get::<i32>(), Some(1));
    assert_eq!(a.state, RunState::Completed);
    assert_ne!(a.run_id, b.run_id);
}
