
/// Snapshot a decision inline, masking the time-varying version fields.
#[macro_export]
macro_rules! snapshot_decision {
    ($decision:expr, @$snapshot:literal) => {{
        insta::assert_json_snapshot!($decision, {
            ".version.hash" => "[hash]",
            ".version.loaded_at" => "[timestamp]",
        }, @$snapshot);
    }};
}
