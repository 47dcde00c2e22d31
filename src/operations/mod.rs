pub mod list_op;
pub mod snapshot_test_op;
pub mod watch_op;
