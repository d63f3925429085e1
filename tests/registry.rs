// Registry integration suite: the host-lifecycle collaborator driven
// through its public surface, the way a host runtime would.
//
// Invariants exercised:
// - A handle resolves while at least one strong reference remains and
//   reports InvalidArgument afterward.
// - The registered destructor runs exactly once per store.
// - Shared-mode stores stay fully operational when driven by id from
//   multiple threads; teardown cannot interleave with in-flight calls.
use shmap::{CloneAdapter, Lookup, Registry, Removal, ResourceType, StoreError, StoreOptions};
use std::sync::atomic::{AtomicUsize, Ordering};

fn registry() -> Registry<CloneAdapter<String>> {
    Registry::new(ResourceType::new("shmap_test", |_| {}))
}

// Test: the end-to-end scenario, driven by handle through the registry.
#[test]
fn end_to_end_by_handle() {
    let r = registry();
    let h = r.create(CloneAdapter::new(), StoreOptions::shared());

    r.put(h, &"a".into(), &"1".into()).unwrap();
    r.put(h, &"b".into(), &"2".into()).unwrap();
    assert_eq!(r.size(h).unwrap(), 2);
    assert_eq!(r.lookup(h, &"a".into()).unwrap(), Lookup::Found("1".to_string()));
    assert_eq!(r.del(h, &"a".into()).unwrap(), Removal::Removed);
    assert_eq!(r.lookup(h, &"a".into()).unwrap(), Lookup::NotFound);
    assert_eq!(r.size(h).unwrap(), 1);
    assert_eq!(r.get(h, &"z".into(), "99".into()).unwrap(), "99".to_string());

    r.release(h).unwrap();
}

// Test: entire store state is lost at destruction; the handle is dead.
// Verifies: after the final release every operation is InvalidArgument.
#[test]
fn destroyed_handle_is_invalid() {
    let r = registry();
    let h = r.create(CloneAdapter::new(), StoreOptions::default());
    r.put(h, &"k".into(), &"v".into()).unwrap();
    r.release(h).unwrap();

    assert!(matches!(
        r.lookup(h, &"k".into()),
        Err(StoreError::InvalidArgument(_))
    ));
    assert!(matches!(r.clear(h), Err(StoreError::InvalidArgument(_))));
    assert!(matches!(
        r.to_list(h),
        Err(StoreError::InvalidArgument(_))
    ));
}

// Test: strong references keep a store alive across release of others;
// the destructor fires only at zero.
// The drop counter is local to this test so parallel tests cannot skew it.
#[test]
fn destructor_fires_at_last_release() {
    static DROPS: AtomicUsize = AtomicUsize::new(0);

    let r: Registry<CloneAdapter<String>> = Registry::new(ResourceType::new("counted", |_| {
        DROPS.fetch_add(1, Ordering::SeqCst);
    }));
    let h = r.create(CloneAdapter::new(), StoreOptions::default());
    r.retain(h).unwrap();
    r.retain(h).unwrap();

    r.release(h).unwrap();
    r.release(h).unwrap();
    assert_eq!(DROPS.load(Ordering::SeqCst), 0);
    r.put(h, &"still".into(), &"here".into()).unwrap();

    r.release(h).unwrap();
    assert_eq!(DROPS.load(Ordering::SeqCst), 1);

    // The stale id cannot trigger another run.
    assert!(r.release(h).is_err());
    assert_eq!(DROPS.load(Ordering::SeqCst), 1);
}

// Test: concurrent use of a shared store by id, with other stores being
// created and destroyed around it.
// Verifies: operations and lifecycle interleave safely; the surviving
// store ends in an exact state and churned stores are each destroyed once.
#[test]
fn concurrent_registry_traffic() {
    const THREADS: usize = 4;
    const KEYS: usize = 25;
    static DROPS: AtomicUsize = AtomicUsize::new(0);

    let r: Registry<CloneAdapter<String>> = Registry::new(ResourceType::new("churned", |_| {
        DROPS.fetch_add(1, Ordering::SeqCst);
    }));
    let h = r.create(CloneAdapter::new(), StoreOptions::shared());

    std::thread::scope(|s| {
        for t in 0..THREADS {
            let r = &r;
            s.spawn(move || {
                for i in 0..KEYS {
                    r.put(h, &format!("t{t}-{i}"), &"v".into()).unwrap();
                }
                // Churn unrelated stores to exercise create/release races.
                let tmp = r.create(CloneAdapter::new(), StoreOptions::shared());
                r.put(tmp, &"scratch".into(), &"x".into()).unwrap();
                r.release(tmp).unwrap();
            });
        }
    });

    assert_eq!(r.size(h).unwrap(), THREADS * KEYS);
    assert_eq!(DROPS.load(Ordering::SeqCst), THREADS);
    r.release(h).unwrap();
    assert_eq!(DROPS.load(Ordering::SeqCst), THREADS + 1);
}

// Test: exclusive-mode stores created through the registry are bound to
// the creating thread, but any thread may manage their lifetime.
#[test]
fn exclusive_store_lifecycle_from_other_thread() {
    let r = registry();
    let h = r.create(CloneAdapter::new(), StoreOptions::default());
    r.put(h, &"k".into(), &"v".into()).unwrap();

    std::thread::scope(|s| {
        s.spawn(|| {
            assert!(matches!(
                r.lookup(h, &"k".into()),
                Err(StoreError::AccessDenied(_))
            ));
            r.retain(h).unwrap();
            r.release(h).unwrap();
        });
    });

    // Owner still works, then tears the store down.
    assert_eq!(r.size(h).unwrap(), 1);
    r.release(h).unwrap();
    assert!(r.size(h).is_err());
}
