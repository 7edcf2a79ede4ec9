use jointanc::Reconstructor;
use jointanc::model::RateModel;
use jointanc::options::ReconstructionOptions;
use jointanc::reconstruct;
use jointanc::tree::InputNode;

fn records(rows: &[(&str, &str)]) -> Vec<(String, String)> {
    rows.iter().map(|(id, seq)| (id.to_string(), seq.to_string())).collect()
}

fn three_taxon_topology() -> InputNode {
    InputNode::internal(
        0.0,
        vec![
            InputNode::internal(0.3, vec![InputNode::leaf("A", 0.1), InputNode::leaf("B", 0.1)]),
            InputNode::leaf("C", 0.2),
        ],
    )
}

#[test]
fn reconstruct_when_worker_count_varies_then_output_is_unchanged() {
    let data = records(&[("A", "ACGTA"), ("B", "ACGTG"), ("C", "ACCTA")]);

    let single = reconstruct(
        &data,
        three_taxon_topology(),
        RateModel::default(),
        ReconstructionOptions::with_workers(1),
    )
    .expect("single worker run should succeed");

    let multi = reconstruct(
        &data,
        three_taxon_topology(),
        RateModel::default(),
        ReconstructionOptions::with_workers(4),
    )
    .expect("multi worker run should succeed");

    assert_eq!(single.alignment.data(), multi.alignment.data());
    assert_eq!(single.tree.node(single.tree.root()).label, multi.tree.node(multi.tree.root()).label);
}

#[test]
fn sealed_reconstructor_when_run_twice_then_results_are_identical() {
    let data = records(&[("A", "AC"), ("B", "AG"), ("C", "GT")]);
    let sealed = Reconstructor::new(&data, three_taxon_topology(), RateModel::default(), ReconstructionOptions::default())
        .expect("build should succeed")
        .seal()
        .expect("seal should succeed");

    let first = sealed.run().expect("first run should succeed");
    let second = sealed.run().expect("second run should succeed");

    assert_eq!(first.alignment.data(), second.alignment.data());
}
