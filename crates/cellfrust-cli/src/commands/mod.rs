//! CLI command implementations.

pub mod init;
pub mod run;
pub mod gen_lists;
pub mod gen_criticals;
pub mod shuffle_criticals;
pub mod roc;

/// File names inside the input and output directories.
pub mod files {
    pub const TRAINING_SET: &str = "training_set.csv";
    pub const TRAINING_LABELS: &str = "labels.csv";
    pub const TEST_SET: &str = "test_set.csv";
    pub const TEST_CLASSES: &str = "test_set_classes.csv";
    pub const LEFT_CRITICALS: &str = "left_criticals.csv";
    pub const RIGHT_CRITICALS: &str = "right_criticals.csv";
    pub const SAMPLES_QUEUE: &str = "samples_queue.csv";
    pub const UNTRAINED_LISTS: &str = "untrained_global_lists.csv";

    pub const TRAINED_LISTS: &str = "trained_global_lists.csv";
    pub const UNTRAINED_TAUS: &str = "untrained_taus.csv";
    pub const TRAINED_TAUS: &str = "trained_taus.csv";
    pub const PHASES: &str = "phases.json";
    pub const CALIBRATION: &str = "calibration.json";
    pub const RESPONSES: &str = "responses.csv";
    pub const ROC_CURVE: &str = "roc_curve.csv";
    pub const AUC: &str = "auc.csv";
}
