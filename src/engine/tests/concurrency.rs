use super::*;
use std::sync::Arc;
use std::thread;

#[test]
fn test_concurrent_evaluation() {
    let attributes = Arc::new(attrs(&[
        ("role", "basic".into()),
        ("department", "infosec".into()),
        ("level", 3.into()),
    ]));
    let mut handles = vec![];

    // Spawn 10 threads, each doing 100 evaluations
    for i in 0..10 {
        let attributes = Arc::clone(&attributes);
        let handle = thread::spawn(move || {
            for _ in 0..100 {
                assert!(evaluate_policy(TIERED_POLICY, &attributes));
                let broken = format!("level >= {i} +");
                assert!(!evaluate_policy(&broken, &attributes));
            }
        });
        handles.push(handle);
    }

    for handle in handles {
        handle.join().unwrap();
    }
}
