use rocket::local::blocking::Client;
use tempfile::TempDir;

use rjournal::build_rocket;
use rjournal::data::open_database;

pub struct TestApp {
    _dir: TempDir,
    pub client: Client,
}

impl TestApp {
    /// Fresh database in a temp dir, with days counted in UTC.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let connection = open_database(&dir.path().join("rjournal.db")).expect("open database");
        let zone = "Z".parse().expect("utc zone");
        let client = Client::tracked(build_rocket(connection, zone)).expect("valid rocket");

        Self { _dir: dir, client }
    }
}
