//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `parceltrack_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

use parceltrack_core::db::open_db_in_memory;
use parceltrack_core::SqliteParcelRepository;

fn main() {
    println!("parceltrack_core ping={}", parceltrack_core::ping());
    println!(
        "parceltrack_core version={}",
        parceltrack_core::core_version()
    );

    // Bootstraps an empty in-memory store and runs the repository readiness
    // checks, so a broken migration or schema fails here, not in a host app.
    let storage = open_db_in_memory()
        .map_err(|err| err.to_string())
        .and_then(|conn| {
            SqliteParcelRepository::try_new(&conn)
                .map(|_| ())
                .map_err(|err| err.to_string())
        });

    match storage {
        Ok(()) => println!("parceltrack_core storage=ready"),
        Err(err) => println!("parceltrack_core storage=error detail={err}"),
    }
}
