pub mod snapshot_broadcaster;
