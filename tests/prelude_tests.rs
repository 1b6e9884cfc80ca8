//! The facade prelude is enough to drive a router end to end.

use std::cell::RefCell;
use std::rc::Rc;

use rstest::rstest;
use wayfinder::prelude::*;

#[rstest]
fn test_prelude_drives_router() {
	// Arrange
	let history = Rc::new(MemoryHistory::new("/").unwrap());
	let router = Router::new(NavigationContext::new(), history.clone(), RouterConfig::default());
	router.define_route("home", "/", "Home", None).unwrap();
	router.define_route("docs", "/docs/:page?", "Docs", None).unwrap();

	let paths = Rc::new(RefCell::new(Vec::new()));
	let sink = Rc::clone(&paths);
	let subscription = router
		.path_bus()
		.subscribe(move |path: &String| sink.borrow_mut().push(path.clone()));

	// Act
	router.navigate("/docs", None);
	router.navigate("/docs/intro", None);
	subscription.unsubscribe();
	router.navigate("/", None);

	// Assert
	assert_eq!(*paths.borrow(), vec!["/docs", "/docs/intro"]);
	assert_eq!(router.route_name().as_deref(), Some("home"));
}

#[rstest]
fn test_crate_modules_are_reexported() {
	let pattern = wayfinder::urls::PathPattern::compile("/users/:id").unwrap();
	let bus = wayfinder::reactive::Bus::new(0_u32);

	assert!(pattern.is_match("/users/1"));
	assert_eq!(bus.state(), 0);
	assert_eq!(
		wayfinder::pages::NavigateOptions::default(),
		NavigateOptions {
			replace_state: false,
			scroll_to_top: true,
		}
	);
}
