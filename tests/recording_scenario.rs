//! End-to-end recording scenarios driven through the public API.

use browser_steps::{
    Pagination, Recipe, Recorder, SelectorDescriptor, Step, StepCommand, StepSequenceStore,
    TextStep,
};
use indexmap::IndexMap;
use std::collections::HashSet;
use tempfile::TempDir;

fn column(name: &str, selector: &str) -> IndexMap<String, TextStep> {
    let mut fields = IndexMap::new();
    fields.insert(
        name.to_string(),
        TextStep {
            id: 0,
            label: name.to_string(),
            data: String::new(),
            selector: SelectorDescriptor::new(selector).with_attribute("innerText"),
        },
    );
    fields
}

fn kinds(store: &StepSequenceStore) -> Vec<String> {
    store.steps().iter().map(|step| step.kind().to_string()).collect()
}

#[test]
fn title_then_list_columns_then_delete() {
    let mut store = StepSequenceStore::new();

    store.add_text_step("Title", "Foo", SelectorDescriptor::new("h1"));
    assert_eq!(store.len(), 1);
    assert_eq!(store.steps()[0].as_text().unwrap().label, "Title");

    store.add_list_step("ul.items", column("price", ".price"), 42, None, None);
    assert_eq!(kinds(&store), ["text", "list"]);

    store.add_list_step("ul.items", column("name", ".name"), 42, None, None);
    assert_eq!(store.len(), 2);
    let list = store.steps()[1].as_list().cloned().unwrap();
    assert_eq!(list.id, 42);
    assert_eq!(list.fields.keys().collect::<Vec<_>>(), ["price", "name"]);

    assert!(store.delete_browser_step(42));
    assert_eq!(kinds(&store), ["text"]);
    assert_eq!(store.steps()[0].as_text().unwrap().label, "Title");
}

#[test]
fn merge_keeps_first_position_among_later_steps() {
    let mut store = StepSequenceStore::new();
    store.add_list_step("table tr", column("a", "td:nth-child(1)"), 7, None, None);
    store.add_screenshot_step(true);
    store.add_text_step("Footer", "bye", SelectorDescriptor::new("footer"));
    store.add_list_step(
        "table tr",
        column("b", "td:nth-child(2)"),
        7,
        Some(Pagination {
            kind: "clickNext".into(),
            selector: "a.next".into(),
        }),
        Some(100),
    );

    assert_eq!(kinds(&store), ["list", "screenshot", "text"]);
    let list = store.get(7).and_then(Step::as_list).unwrap();
    assert_eq!(list.fields.len(), 2);
    assert_eq!(list.limit, Some(100));
}

#[test]
fn leaf_step_ids_are_pairwise_unique() {
    let mut store = StepSequenceStore::new();
    for _ in 0..50 {
        store.add_text_step("dup", "dup", SelectorDescriptor::new("p"));
        store.add_screenshot_step(false);
    }

    let ids: HashSet<_> = store.steps().iter().map(Step::id).collect();
    assert_eq!(store.len(), 100);
    assert_eq!(ids.len(), 100);
}

#[test]
fn recorded_session_round_trips_through_a_recipe_file() {
    let dir = TempDir::new().unwrap();
    let mut recorder = Recorder::new();
    recorder.start();

    let commands = [
        StepCommand::AddText {
            label: "Title".into(),
            data: "Foo".into(),
            selector: SelectorDescriptor::new("h1"),
        },
        StepCommand::AddList {
            list_selector: "ul.items".into(),
            fields: column("price", ".price"),
            list_id: 42,
            pagination: None,
            limit: Some(10),
        },
        StepCommand::AddScreenshot { full_page: true },
    ];
    for command in commands {
        recorder.apply(command).unwrap();
    }

    let recipe = recorder.finish("Items").unwrap();
    let path = dir.path().join(recipe.file_name());
    recipe.save(&path).unwrap();

    let loaded = Recipe::load(&path).unwrap();
    assert_eq!(loaded, recipe);
    assert_eq!(loaded.steps.len(), 3);
    assert!(recorder.apply(StepCommand::Delete { id: 42 }).is_err());
}
