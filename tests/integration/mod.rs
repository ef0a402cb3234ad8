/// Integration tests driving the tracker against both stores
mod tracker_workflow;
mod sqlite_persistence;
