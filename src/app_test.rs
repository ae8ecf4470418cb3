use std::cell::Cell;

use futures::executor::block_on;
use leptos::prelude::*;
use leptos::reactive::owner::Owner;

use super::*;
use crate::net::transport::Method;
use crate::state::auth::SessionUser;
use crate::test_support::{Harness, student};

fn signed_in_harness() -> Harness {
    let h = Harness::new();
    h.tokens.save("tok", &student(1)).unwrap();
    h.session.set_user(Some(SessionUser::Confirmed(student(1))));
    h.session.finish_loading();
    h
}

fn services_of(h: &Harness) -> ServicesHandle {
    StoredValue::new_local(Services { session: h.session.clone(), client: h.client.clone() })
}

#[test]
fn invalidation_tears_down_and_redirects_while_mounted() {
    let owner = Owner::new();
    owner.set();
    let h = signed_in_harness();
    let redirects = Rc::new(Cell::new(0));
    let counter = Rc::clone(&redirects);
    watch_invalidation(services_of(&h), &Liveness::new(), move || counter.set(counter.get() + 1));

    h.transport.respond(Method::Get, "/profile", 401, "");
    let _ = block_on(h.client.fetch_profile());

    assert_eq!(redirects.get(), 1);
    assert_eq!(h.session.current_user(), None);
    assert!(h.storage.is_empty());
}

#[test]
fn cleanup_unsubscribes_the_invalidation_handler() {
    let owner = Owner::new();
    owner.set();
    let h = signed_in_harness();
    let handle = services_of(&h);

    let child = owner.child();
    child.with(|| watch_invalidation(handle, &Liveness::new(), || {}));
    assert_eq!(h.client.events().subscriber_count(), 1);

    child.cleanup();
    assert_eq!(h.client.events().subscriber_count(), 0);

    h.transport.respond(Method::Get, "/profile", 401, "");
    let _ = block_on(h.client.fetch_profile());
    assert_eq!(h.session.current_user(), Some(student(1)));
    assert_eq!(h.tokens.token().as_deref(), Some("tok"));
}

#[test]
fn released_liveness_silences_the_handler() {
    let owner = Owner::new();
    owner.set();
    let h = signed_in_harness();
    let liveness = Liveness::new();
    watch_invalidation(services_of(&h), &liveness, || {});
    liveness.release();

    h.transport.respond(Method::Get, "/profile", 401, "");
    let _ = block_on(h.client.fetch_profile());
    assert_eq!(h.session.current_user(), Some(student(1)));
}
