// Command flows: the non-interactive counterparts of the two seeding
// scripts. Each function takes an `ApiClient` and drives one subcommand.

use crate::api::{ApiClient, CreateUserRequest, LoginRequest};
use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};

/// Password every seeded test account is created with.
pub const TEST_PASSWORD: &str = "password";

/// Email address of the i-th seeded test account.
pub fn test_email(index: u32) -> String {
    format!("user{}@example.com", index)
}

/// Seed `count` deterministic test accounts. Individual failures are
/// reported on stderr and counted, but the run continues so one bad
/// account does not block the rest of the batch. Returns whether every
/// account was created (or already existed).
pub fn create_users(api: &ApiClient, count: u32) -> Result<bool> {
    let bar = ProgressBar::new(u64::from(count));
    bar.set_style(ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}").unwrap());

    let mut failures = 0u32;
    for i in 0..count {
        let req = CreateUserRequest::new(
            &test_email(i),
            TEST_PASSWORD,
            &format!("First {}", i),
            &format!("Last {}", i),
        );
        bar.set_message(req.email.clone());
        if let Err(e) = api.create_user(&req) {
            failures += 1;
            bar.suspend(|| eprintln!("! Failure for {}: {:#}", req.email, e));
        }
        bar.inc(1);
    }
    bar.finish_and_clear();

    if failures == 0 {
        println!("Created {} test users", count);
    } else {
        println!("Created {} test users, {} failed", count - failures, failures);
    }
    Ok(failures == 0)
}

/// Log the given test account in and print its token. The token is the
/// only thing written to stdout so the output can be piped into other
/// tooling.
pub fn get_token(api: &ApiClient, user_id: u32) -> Result<()> {
    let req = LoginRequest::new(&test_email(user_id), TEST_PASSWORD);
    let token = api.login(&req)?;
    println!("{}", token);
    Ok(())
}
