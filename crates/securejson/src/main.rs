//! `securejson-demo`: walks a sample profile through encode and decode.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`] from environment variables.
//! 2. Initialise structured logging.
//! 3. Derive the field key and register the engine in a [`Registry`].
//! 4. Encode a sample [`UserProfile`] and print the protected document.
//! 5. Resolve the engine from the registry and decode the document back.
//! 6. Show that a different password fails closed.

mod profile;

use anyhow::{Context, Result};
use chrono::{TimeZone, Utc};
use tracing::info;

use securejson::config::Config;
use securejson::{Registry, Secret, SecureJson, SecureJsonExt};

use profile::UserProfile;

fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e:#}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    securejson::telemetry::init(&cfg.log_level)?;
    info!(version = env!("CARGO_PKG_VERSION"), "securejson-demo starting");

    // -----------------------------------------------------------------------
    // 3. Key derivation + registry
    // -----------------------------------------------------------------------
    let salt = cfg.salt_bytes()?;
    let codec = SecureJson::configure(Secret::Password(&cfg.password), &salt, cfg.kdf_params())
        .context("failed to configure field encryption")?;

    let registry = Registry::new();
    codec.register(&registry);

    // -----------------------------------------------------------------------
    // 4. Encode
    // -----------------------------------------------------------------------
    let profile = UserProfile {
        name: "Jo Coder".into(),
        email: "Jo@x.com".into(),
        date_of_birth: Utc.with_ymd_and_hms(2001, 7, 16, 0, 0, 0).single(),
        devices: Some(vec![
            [192, 168, 1, 1].into(),
            [192, 168, 1, 14].into(),
            [127, 0, 0, 1].into(),
        ]),
    };
    let document = codec.encode(&profile).context("failed to encode profile")?;
    println!("Ciphered document:\n{document}");

    // -----------------------------------------------------------------------
    // 5. Decode via the registered engine
    // -----------------------------------------------------------------------
    let resolved = SecureJson::from_registry(&registry)
        .context("cipher engine is not registered")?;
    let result = resolved.try_decode::<UserProfile>(&document);
    match result.into_value() {
        Some(decoded) => {
            info!(matches = decoded == profile, "profile decoded");
            println!("Deciphered profile:\n{decoded:#?}");
        }
        None => anyhow::bail!("freshly encoded profile failed to decode"),
    }

    // -----------------------------------------------------------------------
    // 6. Wrong password
    // -----------------------------------------------------------------------
    let wrong = SecureJson::configure(Secret::Password("wrong"), &salt, cfg.kdf_params())
        .context("failed to configure second key")?;
    if document.is_valid_secure_json::<UserProfile>(&wrong).is_some() {
        anyhow::bail!("document decoded under the wrong password");
    }
    info!("wrong password rejected");
    println!("Wrong password: document rejected");

    Ok(())
}
