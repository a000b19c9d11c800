//! Integration tests for intercepting and restoring object members.

use std::sync::{Arc, Mutex};

use spyhole::{
    AccessKind, AccessorSelector, Callable, Error, ErrorKind, Interceptor, Object,
    PropertyDescriptor, SpyRegistry, SpyState, Thrown, Value,
};

fn interceptor() -> Interceptor {
    Interceptor::new(SpyRegistry::new())
}

fn greeter() -> (Object, Callable) {
    let obj = Object::new();
    let greet = Callable::new("greet", |_| Ok(Value::from("hi")));
    obj.define("greet", PropertyDescriptor::method(greet.clone()))
        .unwrap();
    (obj, greet)
}

/// Object with a `value` property backed by a getter and a setter sharing
/// one storage cell.
fn cell(initial: i32) -> (Object, PropertyDescriptor, Arc<Mutex<Value>>) {
    let store = Arc::new(Mutex::new(Value::from(initial)));
    let read = store.clone();
    let write = store.clone();
    let descriptor = PropertyDescriptor::accessor(
        Some(Callable::getter("value", move || {
            Ok(read.lock().unwrap().clone())
        })),
        Some(Callable::setter("value", move |v| {
            *write.lock().unwrap() = v;
            Ok(())
        })),
    );
    let obj = Object::new();
    obj.define("value", descriptor.clone()).unwrap();
    (obj, descriptor, store)
}

#[test]
fn method_is_recorded_and_restored() {
    let (obj, greet) = greeter();
    let before = obj.own_descriptor("greet").unwrap();
    let spy = interceptor()
        .intercept(&obj.clone().into(), "greet", None)
        .unwrap();

    assert_eq!(obj.call("greet", &[]).unwrap(), Value::from("hi"));
    assert_eq!(spy.call_count(), 1);

    spy.restore().unwrap();
    assert_eq!(obj.get("greet").unwrap(), Value::Function(greet));
    assert!(obj.own_descriptor("greet").unwrap().same_as(&before));
    assert_eq!(spy.state(), SpyState::Restored);
}

#[test]
fn installed_member_is_the_spy() {
    let (obj, _) = greeter();
    let spy = interceptor()
        .intercept(&obj.clone().into(), "greet", None)
        .unwrap();

    assert_eq!(obj.get("greet").unwrap(), Value::Function(spy.callable()));
}

#[test]
fn getter_mock_and_restore() {
    let obj = Object::new();
    obj.define(
        "value",
        PropertyDescriptor::getter(Callable::getter("value", || Ok(Value::from(42)))),
    )
    .unwrap();
    let spy = interceptor()
        .intercept(
            &obj.clone().into(),
            AccessorSelector::getter("value"),
            Some(Callable::getter("mock", || Ok(Value::from(99)))),
        )
        .unwrap();

    assert_eq!(obj.get("value").unwrap(), Value::from(99));
    assert_eq!(spy.kind(), Some(AccessKind::Getter));

    spy.restore().unwrap();
    assert_eq!(obj.get("value").unwrap(), Value::from(42));
}

#[test]
fn non_configurable_member_is_left_alone() {
    let obj = Object::new();
    let lock = Callable::new("lock", |_| Ok(Value::Null));
    let descriptor = PropertyDescriptor::method(lock).with_configurable(false);
    obj.define("lock", descriptor.clone()).unwrap();
    let i = interceptor();

    let err = i.intercept(&obj.clone().into(), "lock", None).unwrap_err();
    assert!(matches!(err, Error::NotConfigurable(_)));
    assert_eq!(err.kind(), ErrorKind::Permission);
    assert!(obj.own_descriptor("lock").unwrap().same_as(&descriptor));
    assert!(i.registry().is_empty());
}

#[test]
fn missing_target_is_an_argument_error() {
    let err = interceptor()
        .intercept(&Value::Undefined, "x", None)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Argument);
}

#[test]
fn missing_member_is_a_lookup_error() {
    let (obj, _) = greeter();
    let keys = obj.own_keys();
    let err = interceptor()
        .intercept(&obj.clone().into(), "wave", None)
        .unwrap_err();

    assert!(matches!(err, Error::MemberNotFound(ref name) if &**name == "wave"));
    assert_eq!(err.kind(), ErrorKind::Lookup);
    assert_eq!(obj.own_keys(), keys);
}

#[test]
fn will_call_takes_over_after_earlier_calls() {
    let (obj, _) = greeter();
    let spy = interceptor()
        .intercept(&obj.clone().into(), "greet", None)
        .unwrap();

    assert_eq!(obj.call("greet", &[]).unwrap(), Value::from("hi"));
    spy.will_call(Callable::new("bye", |_| Ok(Value::from("bye"))));
    assert_eq!(obj.call("greet", &[]).unwrap(), Value::from("bye"));
    assert_eq!(obj.call("greet", &[]).unwrap(), Value::from("bye"));

    let results: Vec<_> = spy.calls().iter().map(|c| c.result().cloned()).collect();
    assert_eq!(
        results,
        vec![
            Some(Value::from("hi")),
            Some(Value::from("bye")),
            Some(Value::from("bye"))
        ]
    );
}

#[test]
fn arguments_are_recorded_in_order() {
    let obj = Object::new();
    obj.define(
        "sum",
        PropertyDescriptor::method(Callable::new("sum", |args| {
            Ok(Value::from(args.iter().filter_map(Value::as_number).sum::<f64>()))
        })),
    )
    .unwrap();
    let spy = interceptor()
        .intercept(&obj.clone().into(), "sum", None)
        .unwrap();

    obj.call("sum", &[Value::from(1), Value::from(2)]).unwrap();
    obj.call("sum", &[]).unwrap();
    obj.call("sum", &[Value::from("x")]).unwrap();

    let calls = spy.calls();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[0].arguments(), &[Value::from(1), Value::from(2)]);
    assert!(calls[1].arguments().is_empty());
    assert_eq!(calls[2].arguments(), &[Value::from("x")]);
    assert_eq!(calls[0].result(), Some(&Value::from(3)));
}

#[test]
fn failures_are_recorded_and_propagated() {
    let obj = Object::new();
    obj.define(
        "explode",
        PropertyDescriptor::method(Callable::new("explode", |_| Err(Thrown::new("kaboom")))),
    )
    .unwrap();
    let spy = interceptor()
        .intercept(&obj.clone().into(), "explode", None)
        .unwrap();

    let err = obj.call("explode", &[]).unwrap_err();
    assert_eq!(err.value(), &Value::from("kaboom"));
    assert_eq!(spy.last_call().unwrap().error(), Some(&err));
}

#[test]
fn getter_spy_only_affects_reads() {
    let (obj, descriptor, store) = cell(1);
    let spy = interceptor()
        .intercept(&obj.clone().into(), AccessorSelector::getter("value"), None)
        .unwrap();

    obj.set("value", 5).unwrap();
    assert_eq!(spy.call_count(), 0);
    assert_eq!(*store.lock().unwrap(), Value::from(5));

    assert_eq!(obj.get("value").unwrap(), Value::from(5));
    assert_eq!(spy.call_count(), 1);

    // the setter was kept alongside the spied getter
    let installed = obj.own_descriptor("value").unwrap();
    assert!(installed.set().unwrap().ptr_eq(descriptor.set().unwrap()));
    assert_eq!(installed.writable(), None);

    spy.restore().unwrap();
    assert!(obj.own_descriptor("value").unwrap().same_as(&descriptor));
}

#[test]
fn setter_spy_only_affects_writes() {
    let (obj, descriptor, store) = cell(1);
    let spy = interceptor()
        .intercept(&obj.clone().into(), AccessorSelector::setter("value"), None)
        .unwrap();

    assert_eq!(obj.get("value").unwrap(), Value::from(1));
    assert_eq!(spy.call_count(), 0);

    obj.set("value", 7).unwrap();
    assert_eq!(spy.call_count(), 1);
    assert_eq!(spy.last_call().unwrap().arguments(), &[Value::from(7)]);
    assert_eq!(*store.lock().unwrap(), Value::from(7));

    spy.restore().unwrap();
    assert!(obj.own_descriptor("value").unwrap().same_as(&descriptor));
}

#[test]
fn setter_mock_swallows_writes() {
    let (obj, _, store) = cell(1);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    interceptor()
        .intercept(
            &obj.clone().into(),
            AccessorSelector::setter("value"),
            Some(Callable::setter("mock", move |v| {
                sink.lock().unwrap().push(v);
                Ok(())
            })),
        )
        .unwrap();

    obj.set("value", 3).unwrap();
    assert_eq!(*seen.lock().unwrap(), vec![Value::from(3)]);
    assert_eq!(*store.lock().unwrap(), Value::from(1));
}

#[test]
fn prototype_member_is_replaced_on_the_prototype() {
    let (proto, greet) = greeter();
    let instance = Object::with_prototype(&proto);
    let sibling = Object::with_prototype(&proto);

    let spy = interceptor()
        .intercept(&instance.clone().into(), "greet", None)
        .unwrap();

    assert!(!instance.has_own("greet"));
    sibling.call("greet", &[]).unwrap();
    instance.call("greet", &[]).unwrap();
    assert_eq!(spy.call_count(), 2);

    spy.restore().unwrap();
    assert!(!instance.has_own("greet"));
    assert_eq!(proto.get("greet").unwrap(), Value::Function(greet));
}

#[test]
fn own_member_shadows_prototype() {
    let (proto, proto_greet) = greeter();
    let instance = Object::with_prototype(&proto);
    instance
        .define(
            "greet",
            PropertyDescriptor::method(Callable::new("greet", |_| Ok(Value::from("hey")))),
        )
        .unwrap();

    let spy = interceptor()
        .intercept(&instance.clone().into(), "greet", None)
        .unwrap();

    assert_eq!(instance.call("greet", &[]).unwrap(), Value::from("hey"));
    assert_eq!(proto.get("greet").unwrap(), Value::Function(proto_greet));
    assert_eq!(spy.call_count(), 1);
}

#[test]
fn writability_survives_round_trip() {
    let obj = Object::new();
    let fixed = Callable::new("fixed", |_| Ok(Value::Null));
    let descriptor = PropertyDescriptor::method(fixed)
        .with_writable(false)
        .with_enumerable(true);
    obj.define("fixed", descriptor.clone()).unwrap();

    let spy = interceptor()
        .intercept(&obj.clone().into(), "fixed", None)
        .unwrap();
    let installed = obj.own_descriptor("fixed").unwrap();
    assert_eq!(installed.writable(), Some(false));
    assert!(installed.is_enumerable());

    spy.restore().unwrap();
    assert!(obj.own_descriptor("fixed").unwrap().same_as(&descriptor));
}

#[test]
fn function_static_members_can_be_intercepted() {
    let class = Callable::new("Greeter", |_| Ok(Value::Undefined));
    class
        .properties()
        .define(
            "create",
            PropertyDescriptor::method(Callable::new("create", |_| Ok(Value::from("made")))),
        )
        .unwrap();

    let spy = interceptor()
        .intercept(&class.clone().into(), "create", None)
        .unwrap();
    assert_eq!(
        class.properties().call("create", &[]).unwrap(),
        Value::from("made")
    );
    assert_eq!(spy.call_count(), 1);
}

#[test]
fn layered_spies_unwind_in_reverse_order() {
    let (obj, greet) = greeter();
    let i = interceptor();
    let outer = i.intercept(&obj.clone().into(), "greet", None).unwrap();
    let inner = i.intercept(&obj.clone().into(), "greet", None).unwrap();

    assert_eq!(obj.call("greet", &[]).unwrap(), Value::from("hi"));
    assert_eq!(inner.call_count(), 1);
    assert_eq!(outer.call_count(), 1);
    assert!(inner.original().unwrap().unwrap().ptr_eq(&outer.callable()));

    inner.restore().unwrap();
    assert_eq!(obj.get("greet").unwrap(), Value::Function(outer.callable()));
    outer.restore().unwrap();
    assert_eq!(obj.get("greet").unwrap(), Value::Function(greet));
}

#[test]
fn second_restore_does_not_undo_newer_spy() {
    let (obj, _) = greeter();
    let i = interceptor();
    let first = i.intercept(&obj.clone().into(), "greet", None).unwrap();
    first.restore().unwrap();

    let second = i.intercept(&obj.clone().into(), "greet", None).unwrap();
    first.restore().unwrap();

    assert_eq!(obj.get("greet").unwrap(), Value::Function(second.callable()));
}

#[test]
fn override_set_after_restore_is_discarded_by_the_next_restore() {
    let (obj, greet) = greeter();
    let spy = interceptor()
        .intercept(&obj.clone().into(), "greet", None)
        .unwrap();
    spy.restore().unwrap();

    spy.will_call(Callable::new("bye", |_| Ok(Value::from("bye"))));
    spy.restore().unwrap();

    assert_eq!(spy.call(&[]).unwrap(), Value::from("hi"));
    assert_eq!(obj.get("greet").unwrap(), Value::Function(greet));
}

#[test]
fn registry_enables_a_restore_sweep() {
    let (obj, greet) = greeter();
    let (cell_obj, descriptor, _) = cell(0);
    let i = interceptor();
    i.intercept(&obj.clone().into(), "greet", None).unwrap();
    i.intercept(&cell_obj.clone().into(), AccessorSelector::getter("value"), None)
        .unwrap();
    i.create_spy(None);
    assert_eq!(i.registry().active().len(), 3);

    for spy in i.registry().active().into_iter().rev() {
        spy.restore().unwrap();
    }

    assert!(i.registry().active().is_empty());
    assert_eq!(i.registry().len(), 3);
    assert_eq!(obj.get("greet").unwrap(), Value::Function(greet));
    assert!(
        cell_obj
            .own_descriptor("value")
            .unwrap()
            .same_as(&descriptor)
    );
}

#[test]
fn global_entry_points_register_globally() {
    let (obj, _) = greeter();
    let spy = spyhole::spy_on(&obj.into(), "greet", None).unwrap();
    let bare = spyhole::create_spy(None);

    let registered = SpyRegistry::global().spies();
    assert!(registered.contains(&spy));
    assert!(registered.contains(&bare));
    spy.restore().unwrap();
}
