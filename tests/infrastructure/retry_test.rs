use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use helpline::infrastructure::retry::RetryPolicy;

#[tokio::test]
async fn given_operation_failing_twice_when_running_then_third_attempt_succeeds() {
    let attempts = AtomicU32::new(0);
    let policy = RetryPolicy::new(3, Duration::from_millis(1));

    let result: Result<&str, String> = policy
        .run("flaky", || async {
            if attempts.fetch_add(1, Ordering::SeqCst) < 2 {
                Err("not yet".to_string())
            } else {
                Ok("done")
            }
        })
        .await;

    assert_eq!(result, Ok("done"));
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn given_operation_always_failing_when_running_then_last_error_is_returned_after_max_attempts() {
    let attempts = AtomicU32::new(0);
    let policy = RetryPolicy::new(2, Duration::from_millis(1));

    let result: Result<(), String> = policy
        .run("broken", || async {
            let n = attempts.fetch_add(1, Ordering::SeqCst);
            Err(format!("failure {n}"))
        })
        .await;

    assert_eq!(result, Err("failure 1".to_string()));
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[test]
fn given_zero_attempts_when_creating_policy_then_at_least_one_attempt_is_made() {
    let policy = RetryPolicy::new(0, Duration::from_millis(1));

    assert_eq!(policy.max_attempts, 1);
}

#[test]
fn given_default_policy_when_created_then_three_attempts_one_second_apart() {
    let policy = RetryPolicy::default();

    assert_eq!(policy.max_attempts, 3);
    assert_eq!(policy.base_delay, Duration::from_millis(1000));
}
