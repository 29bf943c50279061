//! Todo list entry point
//!
//! Binds the item store to the page on web, or to the command line on native.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_app {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, Event, EventTarget, HtmlInputElement, KeyboardEvent};

    use todo_list::controller::{self, EditKey, Intent};
    use todo_list::view::{ListRow, ListView, parse_dom_id};
    use todo_list::{ItemStore, LocalStorage};

    /// Page state shared by every event handler
    struct App {
        store: ItemStore<LocalStorage>,
        document: Document,
    }

    type SharedApp = Rc<RefCell<App>>;

    impl App {
        fn create_input(&self) -> Option<HtmlInputElement> {
            self.document
                .get_element_by_id("create-item-input")
                .and_then(|el| el.dyn_into().ok())
        }

        fn draft(&self) -> String {
            self.create_input().map(|input| input.value()).unwrap_or_default()
        }

        /// Apply an intent and redraw
        fn dispatch(&mut self, intent: Intent) {
            log::debug!("Intent: {:?}", intent);
            if let Err(err) = controller::apply(&mut self.store, intent) {
                log::warn!("Intent rejected: {}", err);
            }
            self.render();
        }

        /// Rebuild the list and button visibility from the store
        fn render(&self) {
            let view = ListView::build(&self.store, &self.draft());

            if let Ok(Some(list)) = self.document.query_selector("ul") {
                list.set_inner_html("");
                for row in &view.rows {
                    if let Err(err) = self.render_row(&list, row) {
                        log::warn!("Failed to render row {}: {:?}", row.index, err);
                    }
                }
            }

            set_visible(
                self.document.get_element_by_id("toggle-all-items-button"),
                view.show_toggle_all,
            );
            set_visible(
                self.document.get_element_by_id("create-item-button"),
                view.show_create_button,
            );
            if let Some(summary) = self.document.get_element_by_id("item-summary") {
                summary.set_text_content(Some(&view.summary()));
            }
        }

        fn render_row(&self, list: &Element, row: &ListRow) -> Result<(), JsValue> {
            let li = self.document.create_element("li")?;
            li.set_id(&row.dom_id());

            let checkbox: HtmlInputElement = self.document.create_element("input")?.dyn_into()?;
            checkbox.set_type("checkbox");
            checkbox.class_list().add_1("toggle-item-checkbox")?;
            checkbox.set_checked(row.done);

            let label = self.document.create_element("label")?;
            label.set_text_content(Some(&row.name));
            label.class_list().add_1("item-label")?;
            if row.done {
                label.class_list().add_1("item-strikethrough")?;
            }

            let update_input: HtmlInputElement =
                self.document.create_element("input")?.dyn_into()?;
            update_input.set_type("text");
            update_input.class_list().add_2("update-item-input", "hide")?;
            update_input.set_value(&row.name);

            let delete_button = self.document.create_element("button")?;
            delete_button.set_text_content(Some("-"));
            delete_button.set_class_name("delete-button");

            li.append_child(&checkbox)?;
            li.append_child(&label)?;
            li.append_child(&update_input)?;
            li.append_child(&delete_button)?;
            list.append_child(&li)?;
            Ok(())
        }

        /// Swap a row's label for its rename input
        fn begin_edit(&self, label: &Element) {
            let input = label
                .parent_element()
                .and_then(|li| li.query_selector(".update-item-input").ok().flatten())
                .and_then(|el| el.dyn_into::<HtmlInputElement>().ok());
            if let Some(input) = input {
                set_visible(Some(label.clone()), false);
                set_visible(Some(input.clone().into()), true);
                let _ = input.focus();
            }
        }

        /// Put back the stored name and swap the input for its label
        fn cancel_edit(&self, input: &HtmlInputElement, index: usize) {
            if let Some(item) = self.store.get(index) {
                input.set_value(&item.name);
            }
            let label = input
                .parent_element()
                .and_then(|li| li.query_selector(".item-label").ok().flatten());
            set_visible(Some(input.clone().into()), false);
            set_visible(label, true);
            log::debug!("Edit of item {} cancelled", index);
        }
    }

    fn set_visible(el: Option<Element>, visible: bool) {
        if let Some(el) = el {
            let classes = el.class_list();
            let _ = if visible {
                classes.remove_1("hide")
            } else {
                classes.add_1("hide")
            };
        }
    }

    fn event_element(event: &Event) -> Option<Element> {
        event.target()?.dyn_into().ok()
    }

    /// Store index of the `<li>` containing `el`
    fn row_index(el: &Element) -> Option<usize> {
        parse_dom_id(&el.parent_element()?.id())
    }

    fn has_class(el: &Element, class: &str) -> bool {
        el.class_list().contains(class)
    }

    /// Register a handler that gets the app mutably.
    ///
    /// Events fired while another handler holds the app (focus loss caused by
    /// a redraw) are dropped.
    fn listen<F>(target: &EventTarget, event_type: &str, app: &SharedApp, handler: F)
    where
        F: Fn(&mut App, &Event) + 'static,
    {
        let app = app.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: Event| {
            match app.try_borrow_mut() {
                Ok(mut app) => handler(&mut app, &event),
                Err(_) => log::debug!("Skipping nested {} event", event.type_()),
            }
        });
        let _ = target.add_event_listener_with_callback(event_type, closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_create_form(app: &SharedApp, document: &Document) {
        if let Some(form) = document.get_element_by_id("create-item-form") {
            listen(&form, "submit", app, |app, event| {
                event.prevent_default();
                let name = app.draft();
                if let Some(input) = app.create_input() {
                    input.set_value("");
                }
                app.dispatch(Intent::Create(name));
            });
        }

        if let Some(input) = document.get_element_by_id("create-item-input") {
            listen(&input, "input", app, |app, _event| app.render());
        }
    }

    fn setup_bulk_buttons(app: &SharedApp, document: &Document) {
        if let Some(btn) = document.get_element_by_id("toggle-all-items-button") {
            listen(&btn, "click", app, |app, _event| app.dispatch(Intent::ToggleAll));
        }

        if let Some(btn) = document.get_element_by_id("delete-all-items-button") {
            listen(&btn, "click", app, |app, _event| {
                let confirmed = web_sys::window()
                    .and_then(|w| w.confirm_with_message("This will delete all todo items!").ok())
                    .unwrap_or(false);
                app.dispatch(Intent::DeleteAll { confirmed });
            });
        }
    }

    /// Row events are delegated to the `<ul>` so a redraw needs no rebinding
    fn setup_list(app: &SharedApp, document: &Document) {
        let Ok(Some(list)) = document.query_selector("ul") else {
            log::warn!("No list element found");
            return;
        };

        listen(&list, "change", app, |app, event| {
            let Some(el) = event_element(event) else { return };
            if has_class(&el, "toggle-item-checkbox") {
                if let Some(index) = row_index(&el) {
                    app.dispatch(Intent::Toggle(index));
                }
            }
        });

        listen(&list, "click", app, |app, event| {
            let Some(el) = event_element(event) else { return };
            if has_class(&el, "item-label") {
                app.begin_edit(&el);
            } else if has_class(&el, "delete-button") {
                if let Some(index) = row_index(&el) {
                    app.dispatch(Intent::Delete(index));
                }
            }
        });

        listen(&list, "keyup", app, |app, event| {
            let Some(el) = event_element(event) else { return };
            let Some(key) = event.dyn_ref::<KeyboardEvent>() else { return };
            if !has_class(&el, "update-item-input") {
                return;
            }
            let Some(index) = row_index(&el) else { return };
            let Ok(input) = el.dyn_into::<HtmlInputElement>() else { return };

            match EditKey::from_key(key.key_code(), &input.value()) {
                EditKey::Commit(name) => app.dispatch(Intent::Rename { index, name }),
                EditKey::Revert => app.cancel_edit(&input, index),
                EditKey::Continue => {}
            }
        });

        listen(&list, "focusout", app, |app, event| {
            let Some(el) = event_element(event) else { return };
            if !has_class(&el, "update-item-input") {
                return;
            }
            let Some(index) = row_index(&el) else { return };
            let Ok(input) = el.dyn_into::<HtmlInputElement>() else { return };
            app.dispatch(Intent::CommitEdit {
                index,
                name: input.value(),
            });
        });
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Todo list starting...");

        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            log::error!("No document");
            return;
        };

        let store = match LocalStorage::open().and_then(ItemStore::open) {
            Ok(store) => store,
            Err(err) => {
                log::error!("Failed to open item store: {}", err);
                return;
            }
        };

        let app = Rc::new(RefCell::new(App {
            store,
            document: document.clone(),
        }));

        setup_create_form(&app, &document);
        setup_bulk_buttons(&app, &document);
        setup_list(&app, &document);

        app.borrow().render();
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use std::error::Error;
    use std::path::PathBuf;

    use clap::{Parser, Subcommand};

    use todo_list::controller::{self, Intent};
    use todo_list::view::ListView;
    use todo_list::{FileStorage, ItemStore};

    const DEFAULT_DATA_DIR: &str = ".todo-list";

    /// A to-do list kept as JSON on disk
    #[derive(Parser, Debug)]
    #[command(name = "todo-list", version, about)]
    pub struct Cli {
        /// Directory holding the item file
        #[arg(long, default_value = DEFAULT_DATA_DIR)]
        pub data_dir: PathBuf,

        #[command(subcommand)]
        pub command: Option<Command>,
    }

    #[derive(Subcommand, Debug, PartialEq, Eq)]
    pub enum Command {
        /// Show items, newest first
        List,
        /// Show item totals
        Count,
        /// Append an item
        Add { name: String },
        /// Rename an item
        Rename { index: usize, name: String },
        /// Flip an item's done flag
        Toggle { index: usize },
        /// Mark all done, or all not done if all are done
        ToggleAll,
        /// Remove an item
        Delete { index: usize },
        /// Remove every item
        Clear {
            /// Confirm deleting everything
            #[arg(long, required = true)]
            yes: bool,
        },
    }

    impl Command {
        /// The store change this command makes, if any
        fn intent(self) -> Option<Intent> {
            match self {
                Command::List | Command::Count => None,
                Command::Add { name } => Some(Intent::Create(name)),
                Command::Rename { index, name } => Some(Intent::Rename { index, name }),
                Command::Toggle { index } => Some(Intent::Toggle(index)),
                Command::ToggleAll => Some(Intent::ToggleAll),
                Command::Delete { index } => Some(Intent::Delete(index)),
                Command::Clear { yes } => Some(Intent::DeleteAll { confirmed: yes }),
            }
        }
    }

    pub fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
        log::info!("Using data dir {}", cli.data_dir.display());

        let mut store = ItemStore::open(FileStorage::new(cli.data_dir))?;
        let command = cli.command.unwrap_or(Command::List);
        if command == Command::Count {
            println!("{}", ListView::build(&store, "").summary());
            return Ok(());
        }
        if let Some(intent) = command.intent() {
            controller::apply(&mut store, intent)?;
        }
        print_list(&ListView::build(&store, ""));
        Ok(())
    }

    fn print_list(view: &ListView) {
        for row in &view.rows {
            let mark = if row.done { "x" } else { " " };
            println!("[{}] {:>3}  {}", mark, row.index, row.name);
        }
        println!("{}", view.summary());
    }

}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_app::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();

    let args = <cli::Cli as clap::Parser>::parse();
    if let Err(err) = cli::run(args) {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
