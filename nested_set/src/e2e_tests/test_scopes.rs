//! Test that scopes sharing one store never see each other's bounds.

use crate::error::TreeError;
use crate::store::StoreError;
use crate::testing::new_test_store;
use crate::tree::TreeScope;

#[test]
fn test_scopes_are_isolated() {
    let mut store = new_test_store();
    let menu = TreeScope::new("menu".to_string());
    let footer = TreeScope::new("footer".to_string());
    for id in [1, 2] {
        store.insert_unassigned("menu", id);
    }
    for id in [10, 11, 12] {
        store.insert_unassigned("footer", id);
    }

    menu.mutator(&mut store).set_as_root(&1).expect("set_as_root");
    footer.mutator(&mut store).set_as_root(&10).expect("set_as_root");
    let footer_before = store.snapshot("footer");

    let bounds = menu.mutator(&mut store).add_child(&1, &2).expect("add_child");
    assert_eq!((bounds.left(), bounds.right()), (1, 2));
    assert_eq!(store.snapshot("footer"), footer_before);

    // Both scopes number from the same floor.
    let bounds = footer
        .mutator(&mut store)
        .add_child(&10, &11)
        .expect("add_child");
    assert_eq!((bounds.left(), bounds.right()), (1, 2));

    assert_eq!(menu.query(&store).count_descendants(&1).expect("count"), 1);
    assert_eq!(footer.query(&store).count_descendants(&10).expect("count"), 1);
}

#[test]
fn test_nodes_of_other_scope_are_invisible() {
    let mut store = new_test_store();
    let menu = TreeScope::new("menu".to_string());
    let footer = TreeScope::new("footer".to_string());
    store.insert_unassigned("menu", 1);
    store.insert_unassigned("footer", 10);
    menu.mutator(&mut store).set_as_root(&1).expect("set_as_root");
    footer.mutator(&mut store).set_as_root(&10).expect("set_as_root");

    let result = menu.query(&store).direct_children(&10);
    assert!(matches!(result, Err(TreeError::NotPersisted { .. })));

    let result = menu.mutator(&mut store).move_node(&1, &10);
    assert!(matches!(result, Err(TreeError::NotPersisted { .. })));
}

#[test]
fn test_assign_across_scopes_rolls_back() {
    let mut store = new_test_store();
    let menu = TreeScope::new("menu".to_string());
    let footer = TreeScope::new("footer".to_string());
    store.insert_unassigned("menu", 1);
    store.insert_unassigned("footer", 10);
    store.insert_unassigned("footer", 11);
    footer.mutator(&mut store).set_as_root(&10).expect("set_as_root");
    footer.mutator(&mut store).set_as_root(&11).expect("set_as_root");
    let before = store.snapshot("footer");

    // Record 1 belongs to the menu; the footer sees it as unplaced and
    // the store refuses the final assign after the shifts went through.
    let result = footer.mutator(&mut store).add_child(&10, &1);
    assert!(matches!(
        result,
        Err(TreeError::Store(StoreError::Backend(_)))
    ));
    assert_eq!(store.snapshot("footer"), before);
    assert!(!store.in_transaction());
}
