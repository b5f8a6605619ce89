use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::domain::catalog::{Catalog, ImageBase};
use crate::domain::models::{CartLine, Product};
use crate::domain::services::{CartStore, ConsentStore, NotificationSink};

/// How long the cookie-consent popup waits after the first frame.
pub const COOKIE_POPUP_DELAY: Duration = Duration::from_secs(2);

/// How long a notification toast stays on screen.
pub const NOTIFICATION_TTL: Duration = Duration::from_secs(3);

/// How long the contact form pretends to be sending.
pub const CONTACT_SENDING_DURATION: Duration = Duration::from_millis(1500);

/// How long the contact form shows its confirmation before going idle.
pub const CONTACT_SENT_DURATION: Duration = Duration::from_secs(3);

/// Top-level screens, one per page of the storefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Home,
    Shop,
    Cart,
    Contact,
}

impl Screen {
    pub fn title(self) -> &'static str {
        match self {
            Screen::Home => "Home",
            Screen::Shop => "Shop",
            Screen::Cart => "Cart",
            Screen::Contact => "Contact",
        }
    }

    /// Image references resolve relative to the site root on the home
    /// screen and one level up everywhere else.
    pub fn image_base(self) -> ImageBase {
        match self {
            Screen::Home => ImageBase::SiteRoot,
            _ => ImageBase::Subpage,
        }
    }

    pub fn next(self) -> Self {
        match self {
            Screen::Home => Screen::Shop,
            Screen::Shop => Screen::Cart,
            Screen::Cart => Screen::Contact,
            Screen::Contact => Screen::Home,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            Screen::Home => Screen::Contact,
            Screen::Shop => Screen::Home,
            Screen::Cart => Screen::Shop,
            Screen::Contact => Screen::Cart,
        }
    }
}

/// Input interpretation mode.
///
/// `Normal` navigates, `Search` types into the shop filter, `Editing` types
/// into the focused field (a cart quantity or a contact field), and `Help`
/// shows the key reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Normal,
    Search,
    Editing,
    Help,
}

/// A transient toast message with its expiry time.
#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub expires_at: Instant,
}

/// Queue of live toasts. New messages are stamped on arrival and dropped
/// once their time is up on a later tick.
#[derive(Debug, Default)]
pub struct Notifications {
    queue: VecDeque<Notification>,
}

impl Notifications {
    pub fn expire(&mut self, now: Instant) {
        self.queue.retain(|n| n.expires_at > now);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.queue.iter()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl NotificationSink for Notifications {
    fn notify(&mut self, message: &str) {
        self.queue.push_back(Notification {
            message: message.to_string(),
            expires_at: Instant::now() + NOTIFICATION_TTL,
        });
    }
}

/// Focusable positions on the contact screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContactField {
    #[default]
    Name,
    Email,
    Message,
    Submit,
}

/// Where the fake submission currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitState {
    #[default]
    Idle,
    Sending {
        until: Instant,
    },
    Sent {
        until: Instant,
    },
}

impl SubmitState {
    pub fn label(self) -> &'static str {
        match self {
            SubmitState::Idle => "Send Message",
            SubmitState::Sending { .. } => "Sending...",
            SubmitState::Sent { .. } => "Message Sent!",
        }
    }
}

/// The contact form: three text fields, a focus position, and the fake
/// submission state machine.
#[derive(Debug, Default)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub message: String,
    pub focus: ContactField,
    pub submit: SubmitState,
}

impl ContactForm {
    pub fn focus_next(&mut self) {
        self.focus = match self.focus {
            ContactField::Name => ContactField::Email,
            ContactField::Email => ContactField::Message,
            ContactField::Message => ContactField::Submit,
            ContactField::Submit => ContactField::Name,
        };
    }

    pub fn focus_previous(&mut self) {
        self.focus = match self.focus {
            ContactField::Name => ContactField::Submit,
            ContactField::Email => ContactField::Name,
            ContactField::Message => ContactField::Email,
            ContactField::Submit => ContactField::Message,
        };
    }

    pub fn field_mut(&mut self, field: ContactField) -> Option<&mut String> {
        match field {
            ContactField::Name => Some(&mut self.name),
            ContactField::Email => Some(&mut self.email),
            ContactField::Message => Some(&mut self.message),
            ContactField::Submit => None,
        }
    }

    pub fn is_filled(&self) -> bool {
        !self.name.trim().is_empty()
            && !self.email.trim().is_empty()
            && !self.message.trim().is_empty()
    }

    fn reset_fields(&mut self) {
        self.name.clear();
        self.email.clear();
        self.message.clear();
    }
}

/// Whole-application state.
///
/// Owns the catalog and the two persisted stores, plus everything the
/// renderer needs: the current screen and mode, per-screen selections, the
/// live search filter, the toast queue, the cookie popup timer, and the
/// contact form. Time-driven behavior runs from [`App::on_tick`], which the
/// event loop calls with the current instant, so all of it is testable with
/// chosen instants.
///
/// # Examples
///
/// ```
/// use tshop::application::{App, Screen};
/// use tshop::domain::{Catalog, CartStore, ConsentStore};
/// use tshop::infrastructure::MemoryStore;
///
/// let mut app = App::new(
///     Catalog::load(),
///     CartStore::new(Box::new(MemoryStore::new())),
///     ConsentStore::new(Box::new(MemoryStore::new())),
/// );
///
/// assert_eq!(app.screen, Screen::Home);
/// assert_eq!(app.cart.item_count(), 0);
///
/// app.add_selected_to_cart();
/// assert_eq!(app.cart.item_count(), 1);
/// assert_eq!(app.notifications.len(), 1);
/// ```
pub struct App {
    pub catalog: Catalog,
    pub cart: CartStore,
    pub consent: ConsentStore,
    pub screen: Screen,
    pub mode: AppMode,
    pub home_selected: usize,
    pub shop_selected: usize,
    pub cart_selected: usize,
    pub search_query: String,
    pub quantity_input: String,
    pub cursor_position: usize,
    pub status_message: Option<String>,
    pub help_scroll: u16,
    pub notifications: Notifications,
    pub cookie_popup_visible: bool,
    pub cookie_popup_at: Option<Instant>,
    pub contact: ContactForm,
    ready: bool,
    editing_backup: Option<String>,
}

impl App {
    pub fn new(catalog: Catalog, cart: CartStore, consent: ConsentStore) -> Self {
        Self {
            catalog,
            cart,
            consent,
            screen: Screen::Home,
            mode: AppMode::Normal,
            home_selected: 0,
            shop_selected: 0,
            cart_selected: 0,
            search_query: String::new(),
            quantity_input: String::new(),
            cursor_position: 0,
            status_message: None,
            help_scroll: 0,
            notifications: Notifications::default(),
            cookie_popup_visible: false,
            cookie_popup_at: None,
            contact: ContactForm::default(),
            ready: false,
            editing_backup: None,
        }
    }

    /// Arms the cookie popup timer after the first frame has been drawn,
    /// unless consent was already recorded on a previous run. Later calls
    /// do nothing.
    pub fn on_ready(&mut self, now: Instant) {
        if self.ready {
            return;
        }
        self.ready = true;
        if !self.consent.is_answered() {
            self.cookie_popup_at = Some(now + COOKIE_POPUP_DELAY);
        }
    }

    /// Advances all time-driven state: expires toasts, reveals the cookie
    /// popup once its delay has passed, and steps the contact submission
    /// through sending and sent back to idle.
    pub fn on_tick(&mut self, now: Instant) {
        self.notifications.expire(now);

        if let Some(at) = self.cookie_popup_at {
            if now >= at {
                self.cookie_popup_at = None;
                self.cookie_popup_visible = true;
            }
        }

        match self.contact.submit {
            SubmitState::Sending { until } if now >= until => {
                self.contact.reset_fields();
                self.contact.submit = SubmitState::Sent {
                    until: now + CONTACT_SENT_DURATION,
                };
            }
            SubmitState::Sent { until } if now >= until => {
                self.contact.submit = SubmitState::Idle;
            }
            _ => {}
        }
    }

    pub fn go_to(&mut self, screen: Screen) {
        self.screen = screen;
        self.status_message = None;
    }

    pub fn next_screen(&mut self) {
        self.go_to(self.screen.next());
    }

    pub fn previous_screen(&mut self) {
        self.go_to(self.screen.previous());
    }

    /// The featured products for the current screen, image references
    /// already rebased for it.
    pub fn featured(&self) -> Vec<Product> {
        self.catalog.featured(self.screen.image_base())
    }

    /// The shop listing under the current search filter. An empty query
    /// lists the whole catalog.
    pub fn shop_listing(&self) -> Vec<&Product> {
        self.catalog.search(&self.search_query)
    }

    pub fn selected_shop_product(&self) -> Option<&Product> {
        self.shop_listing().get(self.shop_selected).copied()
    }

    pub fn selected_cart_line(&self) -> Option<&CartLine> {
        self.cart.lines().get(self.cart_selected)
    }

    pub fn select_next(&mut self) {
        match self.screen {
            Screen::Home => {
                let len = self.featured().len();
                if len > 0 {
                    self.home_selected = (self.home_selected + 1).min(len - 1);
                }
            }
            Screen::Shop => {
                let len = self.shop_listing().len();
                if len > 0 {
                    self.shop_selected = (self.shop_selected + 1).min(len - 1);
                }
            }
            Screen::Cart => {
                let len = self.cart.len();
                if len > 0 {
                    self.cart_selected = (self.cart_selected + 1).min(len - 1);
                }
            }
            Screen::Contact => self.contact.focus_next(),
        }
    }

    pub fn select_previous(&mut self) {
        match self.screen {
            Screen::Home => self.home_selected = self.home_selected.saturating_sub(1),
            Screen::Shop => self.shop_selected = self.shop_selected.saturating_sub(1),
            Screen::Cart => self.cart_selected = self.cart_selected.saturating_sub(1),
            Screen::Contact => self.contact.focus_previous(),
        }
    }

    /// Adds the highlighted product to the cart. The cart snapshots the
    /// catalog record, not the screen-local copy with a rebased image.
    pub fn add_selected_to_cart(&mut self) {
        let id = match self.screen {
            Screen::Home => self.featured().get(self.home_selected).map(|p| p.id),
            Screen::Shop => self.selected_shop_product().map(|p| p.id),
            _ => None,
        };
        let Some(product) = id.and_then(|id| self.catalog.find(id)).cloned() else {
            return;
        };
        self.cart.add_item(&product, &mut self.notifications);
    }

    pub fn remove_selected_from_cart(&mut self) {
        if let Some(id) = self.selected_cart_line().map(|l| l.product.id) {
            self.cart.remove_item(id);
            self.clamp_cart_selection();
        }
    }

    pub fn increment_selected_quantity(&mut self) {
        if let Some((id, quantity)) = self
            .selected_cart_line()
            .map(|l| (l.product.id, l.quantity))
        {
            self.cart.update_quantity(id, quantity.saturating_add(1));
        }
    }

    /// Drops the highlighted line's quantity by one; at one unit this
    /// removes the line, same as setting the quantity to zero.
    pub fn decrement_selected_quantity(&mut self) {
        if let Some((id, quantity)) = self
            .selected_cart_line()
            .map(|l| (l.product.id, l.quantity))
        {
            self.cart.update_quantity(id, quantity.saturating_sub(1));
            self.clamp_cart_selection();
        }
    }

    pub fn clear_cart(&mut self) {
        self.cart.clear();
        self.cart_selected = 0;
    }

    pub fn accept_cookies(&mut self) {
        self.consent.accept();
        self.cookie_popup_visible = false;
        self.cookie_popup_at = None;
    }

    pub fn decline_cookies(&mut self) {
        self.consent.decline();
        self.cookie_popup_visible = false;
        self.cookie_popup_at = None;
    }

    /// Enters search mode on the shop screen; elsewhere it does nothing.
    pub fn start_search(&mut self) {
        if self.screen != Screen::Shop {
            return;
        }
        self.mode = AppMode::Search;
        self.cursor_position = self.search_query.chars().count();
        self.status_message = None;
    }

    /// Leaves search mode keeping the query as the active filter.
    pub fn finish_search(&mut self) {
        self.mode = AppMode::Normal;
    }

    /// Leaves search mode and drops the filter.
    pub fn cancel_search(&mut self) {
        self.mode = AppMode::Normal;
        self.search_query.clear();
        self.cursor_position = 0;
        self.clamp_shop_selection();
    }

    /// Starts editing the focused value: the highlighted line's quantity on
    /// the cart screen, or the focused text field on the contact screen.
    pub fn start_editing(&mut self) {
        match self.screen {
            Screen::Cart => {
                if let Some(quantity) = self.selected_cart_line().map(|l| l.quantity) {
                    self.quantity_input = quantity.to_string();
                    self.cursor_position = self.quantity_input.chars().count();
                    self.mode = AppMode::Editing;
                    self.status_message = None;
                }
            }
            Screen::Contact => {
                let focus = self.contact.focus;
                if let Some(field) = self.contact.field_mut(focus) {
                    self.editing_backup = Some(field.clone());
                    self.cursor_position = field.chars().count();
                    self.mode = AppMode::Editing;
                    self.status_message = None;
                }
            }
            _ => {}
        }
    }

    /// Commits the edit. On the cart screen the typed quantity is applied,
    /// with zero removing the line; input that is not a whole number keeps
    /// the editor open with a message. On the contact screen the field was
    /// edited in place, so this just drops the undo copy.
    pub fn finish_editing(&mut self) {
        match self.screen {
            Screen::Cart => match self.quantity_input.trim().parse::<u32>() {
                Ok(quantity) => {
                    if let Some(id) = self.selected_cart_line().map(|l| l.product.id) {
                        self.cart.update_quantity(id, quantity);
                    }
                    self.mode = AppMode::Normal;
                    self.quantity_input.clear();
                    self.cursor_position = 0;
                    self.clamp_cart_selection();
                }
                Err(_) => {
                    self.status_message = Some("Quantity must be a whole number".to_string());
                }
            },
            Screen::Contact => {
                self.editing_backup = None;
                self.mode = AppMode::Normal;
                self.cursor_position = 0;
            }
            _ => self.mode = AppMode::Normal,
        }
    }

    /// Abandons the edit, restoring whatever was there before.
    pub fn cancel_editing(&mut self) {
        if self.screen == Screen::Contact {
            let focus = self.contact.focus;
            if let (Some(backup), Some(field)) =
                (self.editing_backup.take(), self.contact.field_mut(focus))
            {
                *field = backup;
            }
        }
        self.quantity_input.clear();
        self.cursor_position = 0;
        self.mode = AppMode::Normal;
        self.status_message = None;
    }

    /// Kicks off the fake submission if the form is idle and filled in.
    pub fn submit_contact(&mut self, now: Instant) {
        if !matches!(self.contact.submit, SubmitState::Idle) {
            return;
        }
        if !self.contact.is_filled() {
            self.status_message = Some("Please fill in all fields before sending".to_string());
            return;
        }
        self.status_message = None;
        self.contact.submit = SubmitState::Sending {
            until: now + CONTACT_SENDING_DURATION,
        };
    }

    pub fn open_help(&mut self) {
        self.mode = AppMode::Help;
        self.help_scroll = 0;
    }

    pub fn close_help(&mut self) {
        self.mode = AppMode::Normal;
    }

    pub fn scroll_help_up(&mut self) {
        self.help_scroll = self.help_scroll.saturating_sub(1);
    }

    pub fn scroll_help_down(&mut self) {
        self.help_scroll = self.help_scroll.saturating_add(1);
    }

    pub fn insert_char(&mut self, c: char) {
        let cursor = self.cursor_position;
        let edited = if let Some(buffer) = self.active_buffer_mut() {
            let at = byte_offset(buffer, cursor);
            buffer.insert(at, c);
            true
        } else {
            false
        };
        if edited {
            self.cursor_position = cursor + 1;
            self.after_buffer_edit();
        }
    }

    pub fn delete_char(&mut self) {
        let cursor = self.cursor_position;
        if cursor == 0 {
            return;
        }
        let edited = if let Some(buffer) = self.active_buffer_mut() {
            let at = byte_offset(buffer, cursor - 1);
            buffer.remove(at);
            true
        } else {
            false
        };
        if edited {
            self.cursor_position = cursor - 1;
            self.after_buffer_edit();
        }
    }

    pub fn move_cursor_left(&mut self) {
        self.cursor_position = self.cursor_position.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        let len = self
            .active_buffer()
            .map(|b| b.chars().count())
            .unwrap_or(0);
        self.cursor_position = (self.cursor_position + 1).min(len);
    }

    /// The text buffer edits currently apply to, if any.
    pub fn active_buffer(&self) -> Option<&str> {
        match (self.mode, self.screen) {
            (AppMode::Search, _) => Some(self.search_query.as_str()),
            (AppMode::Editing, Screen::Cart) => Some(self.quantity_input.as_str()),
            (AppMode::Editing, Screen::Contact) => match self.contact.focus {
                ContactField::Name => Some(self.contact.name.as_str()),
                ContactField::Email => Some(self.contact.email.as_str()),
                ContactField::Message => Some(self.contact.message.as_str()),
                ContactField::Submit => None,
            },
            _ => None,
        }
    }

    fn active_buffer_mut(&mut self) -> Option<&mut String> {
        match (self.mode, self.screen) {
            (AppMode::Search, _) => Some(&mut self.search_query),
            (AppMode::Editing, Screen::Cart) => Some(&mut self.quantity_input),
            (AppMode::Editing, Screen::Contact) => {
                let focus = self.contact.focus;
                self.contact.field_mut(focus)
            }
            _ => None,
        }
    }

    fn after_buffer_edit(&mut self) {
        if self.mode == AppMode::Search {
            self.clamp_shop_selection();
        }
    }

    fn clamp_shop_selection(&mut self) {
        let len = self.shop_listing().len();
        self.shop_selected = self.shop_selected.min(len.saturating_sub(1));
    }

    fn clamp_cart_selection(&mut self) {
        self.cart_selected = self.cart_selected.min(self.cart.len().saturating_sub(1));
    }
}

fn byte_offset(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    use crate::domain::models::ProductId;
    use crate::domain::services::{
        ADDED_TO_CART_MESSAGE, CONSENT_KEY, CookieConsent, KeyValueStore,
    };
    use crate::infrastructure::MemoryStore;

    const TEST_CSV: &str = "\
id,name,price,image,category,description,badge
1,110 Diamonds,1.49,images/battle-pass.jpg,Diamonds,Perfect starter pack,Popular
2,231 Diamonds,2.99,images/akm-skin.jpg,Diamonds,Great value bundle,Limited
3,583 Diamonds,6.99,images/elite-outfit.jpg,Diamonds,Most popular choice,New
4,$10 Gift Card,10.00,images/helmet.jpg,Gift Cards,Instant digital delivery,New
5,$25 Gift Card,25.00,images/uc-credits-2k.jpg,Gift Cards,Perfect gift for gamers,Best Value
";

    fn app() -> App {
        App::new(
            Catalog::from_csv(TEST_CSV),
            CartStore::new(Box::new(MemoryStore::new())),
            ConsentStore::new(Box::new(MemoryStore::new())),
        )
    }

    fn filled_contact(app: &mut App) {
        app.contact.name = "Ada".to_string();
        app.contact.email = "ada@example.com".to_string();
        app.contact.message = "Hello there".to_string();
    }

    #[test]
    fn test_starts_on_home_in_normal_mode() {
        let app = app();
        assert_eq!(app.screen, Screen::Home);
        assert_eq!(app.mode, AppMode::Normal);
        assert!(!app.cookie_popup_visible);
        assert!(app.notifications.is_empty());
    }

    #[test]
    fn test_screen_cycle_wraps() {
        let mut app = app();
        app.next_screen();
        assert_eq!(app.screen, Screen::Shop);
        app.next_screen();
        app.next_screen();
        app.next_screen();
        assert_eq!(app.screen, Screen::Home);

        app.previous_screen();
        assert_eq!(app.screen, Screen::Contact);
    }

    #[test]
    fn test_featured_uses_site_root_base_on_home() {
        let app = app();
        let featured = app.featured();
        assert_eq!(featured.len(), 3);
        assert_eq!(featured[0].image, "images/battle-pass.jpg");
    }

    #[test]
    fn test_featured_uses_subpage_base_off_home() {
        let mut app = app();
        app.go_to(Screen::Shop);
        assert_eq!(app.featured()[0].image, "../images/battle-pass.jpg");
    }

    #[test]
    fn test_select_next_clamps_at_end() {
        let mut app = app();
        app.go_to(Screen::Shop);
        for _ in 0..20 {
            app.select_next();
        }
        assert_eq!(app.shop_selected, 4);
    }

    #[test]
    fn test_select_previous_clamps_at_zero() {
        let mut app = app();
        app.go_to(Screen::Shop);
        app.select_previous();
        assert_eq!(app.shop_selected, 0);
    }

    #[test]
    fn test_add_selected_from_home_notifies() {
        let mut app = app();
        app.add_selected_to_cart();

        assert_eq!(app.cart.item_count(), 1);
        assert_eq!(app.cart.lines()[0].product.id, ProductId(1));
        let messages: Vec<&str> = app
            .notifications
            .iter()
            .map(|n| n.message.as_str())
            .collect();
        assert_eq!(messages, vec![ADDED_TO_CART_MESSAGE]);
    }

    #[test]
    fn test_cart_snapshot_keeps_canonical_image() {
        let mut app = app();
        app.go_to(Screen::Shop);
        app.add_selected_to_cart();

        // The shop screen shows "../images/..." but the stored line keeps
        // the catalog's own reference.
        assert_eq!(app.cart.lines()[0].product.image, "images/battle-pass.jpg");
    }

    #[test]
    fn test_add_selected_on_cart_screen_is_noop() {
        let mut app = app();
        app.go_to(Screen::Cart);
        app.add_selected_to_cart();
        assert!(app.cart.is_empty());
        assert!(app.notifications.is_empty());
    }

    #[test]
    fn test_search_filters_shop_listing() {
        let mut app = app();
        app.go_to(Screen::Shop);
        assert_eq!(app.shop_listing().len(), 5);

        app.start_search();
        assert_eq!(app.mode, AppMode::Search);
        for c in "gift".chars() {
            app.insert_char(c);
        }
        assert_eq!(app.shop_listing().len(), 2);

        app.finish_search();
        assert_eq!(app.mode, AppMode::Normal);
        assert_eq!(app.shop_listing().len(), 2);

        app.start_search();
        app.cancel_search();
        assert_eq!(app.shop_listing().len(), 5);
    }

    #[test]
    fn test_search_only_starts_on_shop() {
        let mut app = app();
        app.start_search();
        assert_eq!(app.mode, AppMode::Normal);
    }

    #[test]
    fn test_search_clamps_selection() {
        let mut app = app();
        app.go_to(Screen::Shop);
        for _ in 0..4 {
            app.select_next();
        }
        assert_eq!(app.shop_selected, 4);

        app.start_search();
        for c in "gift".chars() {
            app.insert_char(c);
        }
        assert_eq!(app.shop_selected, 1);
        assert!(app.selected_shop_product().is_some());
    }

    #[test]
    fn test_cursor_editing_in_search() {
        let mut app = app();
        app.go_to(Screen::Shop);
        app.start_search();

        app.insert_char('g');
        app.insert_char('t');
        app.move_cursor_left();
        app.insert_char('i');
        assert_eq!(app.search_query, "git");

        app.delete_char();
        assert_eq!(app.search_query, "gt");
        assert_eq!(app.cursor_position, 1);

        app.move_cursor_right();
        assert_eq!(app.cursor_position, 2);
        app.move_cursor_right();
        assert_eq!(app.cursor_position, 2);
    }

    #[test]
    fn test_quantity_edit_commits() {
        let mut app = app();
        app.add_selected_to_cart();
        app.go_to(Screen::Cart);

        app.start_editing();
        assert_eq!(app.mode, AppMode::Editing);
        assert_eq!(app.quantity_input, "1");

        app.delete_char();
        app.insert_char('4');
        app.finish_editing();

        assert_eq!(app.mode, AppMode::Normal);
        assert_eq!(app.cart.lines()[0].quantity, 4);
        assert_eq!(app.cart.item_count(), 4);
    }

    #[test]
    fn test_quantity_edit_zero_removes_line() {
        let mut app = app();
        app.add_selected_to_cart();
        app.go_to(Screen::Cart);

        app.start_editing();
        app.delete_char();
        app.insert_char('0');
        app.finish_editing();

        assert!(app.cart.is_empty());
        assert_eq!(app.cart_selected, 0);
    }

    #[test]
    fn test_quantity_edit_rejects_garbage() {
        let mut app = app();
        app.add_selected_to_cart();
        app.go_to(Screen::Cart);

        app.start_editing();
        app.insert_char('x');
        app.finish_editing();

        assert_eq!(app.mode, AppMode::Editing);
        assert!(app.status_message.is_some());
        assert_eq!(app.cart.lines()[0].quantity, 1);
    }

    #[test]
    fn test_quantity_edit_cancel_keeps_line() {
        let mut app = app();
        app.add_selected_to_cart();
        app.go_to(Screen::Cart);

        app.start_editing();
        app.delete_char();
        app.insert_char('9');
        app.cancel_editing();

        assert_eq!(app.mode, AppMode::Normal);
        assert_eq!(app.cart.lines()[0].quantity, 1);
        assert!(app.quantity_input.is_empty());
    }

    #[test]
    fn test_start_editing_on_empty_cart_is_noop() {
        let mut app = app();
        app.go_to(Screen::Cart);
        app.start_editing();
        assert_eq!(app.mode, AppMode::Normal);
    }

    #[test]
    fn test_cart_plus_minus_and_remove() {
        let mut app = app();
        app.add_selected_to_cart();
        app.go_to(Screen::Cart);

        app.increment_selected_quantity();
        assert_eq!(app.cart.lines()[0].quantity, 2);

        app.decrement_selected_quantity();
        assert_eq!(app.cart.lines()[0].quantity, 1);

        app.decrement_selected_quantity();
        assert!(app.cart.is_empty());
    }

    #[test]
    fn test_remove_selected_clamps_selection() {
        let mut app = app();
        app.add_selected_to_cart();
        app.go_to(Screen::Shop);
        app.select_next();
        app.add_selected_to_cart();
        app.go_to(Screen::Cart);
        assert_eq!(app.cart.len(), 2);

        app.select_next();
        assert_eq!(app.cart_selected, 1);
        app.remove_selected_from_cart();

        assert_eq!(app.cart.len(), 1);
        assert_eq!(app.cart_selected, 0);
        assert!(app.selected_cart_line().is_some());
    }

    #[test]
    fn test_clear_cart_resets_selection() {
        let mut app = app();
        app.add_selected_to_cart();
        app.add_selected_to_cart();
        app.go_to(Screen::Cart);

        app.clear_cart();

        assert!(app.cart.is_empty());
        assert_eq!(app.cart.total(), Decimal::ZERO);
        assert_eq!(app.cart_selected, 0);
    }

    #[test]
    fn test_cookie_popup_appears_after_delay() {
        let mut app = app();
        let t0 = Instant::now();

        app.on_ready(t0);
        assert!(!app.cookie_popup_visible);

        app.on_tick(t0 + Duration::from_millis(1900));
        assert!(!app.cookie_popup_visible);

        app.on_tick(t0 + Duration::from_secs(2));
        assert!(app.cookie_popup_visible);
    }

    #[test]
    fn test_cookie_popup_skipped_when_already_answered() {
        let mut store = MemoryStore::new();
        store.set(CONSENT_KEY, "false".to_string()).unwrap();
        let mut app = App::new(
            Catalog::from_csv(TEST_CSV),
            CartStore::new(Box::new(MemoryStore::new())),
            ConsentStore::new(Box::new(store)),
        );

        let t0 = Instant::now();
        app.on_ready(t0);
        assert!(app.cookie_popup_at.is_none());

        app.on_tick(t0 + Duration::from_secs(5));
        assert!(!app.cookie_popup_visible);
    }

    #[test]
    fn test_on_ready_is_one_shot() {
        let mut app = app();
        let t0 = Instant::now();

        app.on_ready(t0);
        app.on_tick(t0 + Duration::from_secs(2));
        app.accept_cookies();

        app.on_ready(t0 + Duration::from_secs(3));
        assert!(app.cookie_popup_at.is_none());
        assert!(!app.cookie_popup_visible);
    }

    #[test]
    fn test_accept_and_decline_record_consent() {
        let mut app = app();
        app.cookie_popup_visible = true;
        app.accept_cookies();
        assert!(!app.cookie_popup_visible);
        assert_eq!(app.consent.consent(), CookieConsent::Accepted);

        let mut app = self::app();
        app.cookie_popup_visible = true;
        app.decline_cookies();
        assert_eq!(app.consent.consent(), CookieConsent::Declined);
    }

    #[test]
    fn test_notifications_expire_on_tick() {
        let mut app = app();
        app.add_selected_to_cart();
        app.add_selected_to_cart();
        assert_eq!(app.notifications.len(), 2);

        app.on_tick(Instant::now() + Duration::from_secs(4));
        assert!(app.notifications.is_empty());
    }

    #[test]
    fn test_contact_field_editing() {
        let mut app = app();
        app.go_to(Screen::Contact);

        app.start_editing();
        for c in "Ada".chars() {
            app.insert_char(c);
        }
        app.finish_editing();

        assert_eq!(app.contact.name, "Ada");
        assert_eq!(app.mode, AppMode::Normal);
    }

    #[test]
    fn test_contact_cancel_restores_field() {
        let mut app = app();
        app.go_to(Screen::Contact);
        app.contact.name = "Ada".to_string();

        app.start_editing();
        for c in " Lovelace".chars() {
            app.insert_char(c);
        }
        assert_eq!(app.contact.name, "Ada Lovelace");

        app.cancel_editing();
        assert_eq!(app.contact.name, "Ada");
    }

    #[test]
    fn test_start_editing_on_submit_focus_is_noop() {
        let mut app = app();
        app.go_to(Screen::Contact);
        app.contact.focus = ContactField::Submit;
        app.start_editing();
        assert_eq!(app.mode, AppMode::Normal);
    }

    #[test]
    fn test_contact_focus_cycles() {
        let mut app = app();
        app.go_to(Screen::Contact);

        app.select_next();
        assert_eq!(app.contact.focus, ContactField::Email);
        app.select_next();
        app.select_next();
        assert_eq!(app.contact.focus, ContactField::Submit);
        app.select_next();
        assert_eq!(app.contact.focus, ContactField::Name);

        app.select_previous();
        assert_eq!(app.contact.focus, ContactField::Submit);
    }

    #[test]
    fn test_contact_submit_requires_filled_fields() {
        let mut app = app();
        app.go_to(Screen::Contact);

        app.submit_contact(Instant::now());

        assert_eq!(app.contact.submit, SubmitState::Idle);
        assert!(app.status_message.is_some());
    }

    #[test]
    fn test_contact_submit_sequence() {
        let mut app = app();
        app.go_to(Screen::Contact);
        filled_contact(&mut app);
        let t0 = Instant::now();

        app.submit_contact(t0);
        assert_eq!(app.contact.submit.label(), "Sending...");

        app.on_tick(t0 + Duration::from_millis(1400));
        assert_eq!(app.contact.submit.label(), "Sending...");
        assert_eq!(app.contact.name, "Ada");

        app.on_tick(t0 + Duration::from_millis(1500));
        assert_eq!(app.contact.submit.label(), "Message Sent!");
        assert!(app.contact.name.is_empty());
        assert!(app.contact.email.is_empty());
        assert!(app.contact.message.is_empty());

        app.on_tick(t0 + Duration::from_millis(4400));
        assert_eq!(app.contact.submit.label(), "Message Sent!");

        app.on_tick(t0 + Duration::from_millis(4500));
        assert_eq!(app.contact.submit.label(), "Send Message");
    }

    #[test]
    fn test_contact_submit_ignored_while_sending() {
        let mut app = app();
        app.go_to(Screen::Contact);
        filled_contact(&mut app);
        let t0 = Instant::now();

        app.submit_contact(t0);
        let first = app.contact.submit;
        app.submit_contact(t0 + Duration::from_millis(500));
        assert_eq!(app.contact.submit, first);
    }

    #[test]
    fn test_help_open_scroll_close() {
        let mut app = app();
        app.open_help();
        assert_eq!(app.mode, AppMode::Help);

        app.scroll_help_down();
        app.scroll_help_down();
        assert_eq!(app.help_scroll, 2);
        app.scroll_help_up();
        assert_eq!(app.help_scroll, 1);

        app.close_help();
        assert_eq!(app.mode, AppMode::Normal);
    }
}
