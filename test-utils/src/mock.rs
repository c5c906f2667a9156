use std::path::PathBuf;
use std::str::FromStr;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use simplenotes::data::UserId;
use simplenotes::identity::{AccessTokenGenerator, AccessTokenKey};
use time::{Duration, OffsetDateTime};
use crate::ports::next_port;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MockScoping {
    Global,
    PerUser,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MockBackend {
    File,
    Memory,
}

/// A temporary root laid out like an installation: the config under
/// `etc/simplenotes`, the key under `etc/simplenotes/private` and the
/// notes under `var/simplenotes`.
#[derive(Debug)]
pub struct MockConfig {
    pub root: TempDir,
    pub config_file: PathBuf,
    pub data_directory: PathBuf,
    pub key_file: PathBuf,
    pub key: AccessTokenKey,
    pub port: u16,
}

impl MockConfig {
    pub fn url(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}/{}", self.port, path.trim_start_matches('/'))
    }

    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}/api/", self.port)
    }

    pub fn token_for(&self, user_id: &str) -> String {
        let user_id = UserId::from_str(user_id)
            .unwrap_or_else(|e| panic!("invalid test user id: {e}"));
        let now = OffsetDateTime::now_utc();
        AccessTokenGenerator::new(&self.key)
            .generate_token(&user_id, now - Duration::minutes(1), now + Duration::minutes(15))
            .unwrap_or_else(|e| panic!("could not issue a test token: {e}"))
    }
}

pub fn setup_config(scoping: MockScoping, backend: MockBackend) -> MockConfig {
    let root = TempDir::new().unwrap();
    let config_dir = root.child("etc/simplenotes");
    let private_dir = config_dir.child("private");
    private_dir.create_dir_all().unwrap();
    let data_dir = root.child("var/simplenotes");
    data_dir.create_dir_all().unwrap();

    let key = AccessTokenKey::generate(&mut rand::rng());
    let key_file = private_dir.child("access_token_key.b64");
    key_file.write_str(&key.to_base64()).unwrap();

    let port = next_port();
    let backend_section = match backend {
        MockBackend::File => format!(
            "kind = \"file\"\ndata_directory = \"{}\"\n",
            data_dir.to_str().unwrap(),
        ),
        MockBackend::Memory => "kind = \"memory\"\n".to_owned(),
    };
    let config = format!(
        r#"address = "127.0.0.1"
port = {port}
scoping = "{}"
access_token_key = "{}"

[backend]
{backend_section}"#,
        match scoping {
            MockScoping::Global => "global",
            MockScoping::PerUser => "per_user",
        },
        key_file.to_str().unwrap(),
    );
    let config_file = config_dir.child("simplenotes.toml");
    config_file.write_str(&config).unwrap();

    MockConfig {
        config_file: config_file.to_path_buf(),
        data_directory: data_dir.to_path_buf(),
        key_file: key_file.to_path_buf(),
        key,
        port,
        root,
    }
}
