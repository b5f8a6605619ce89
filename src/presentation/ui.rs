use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap},
};

use crate::application::state::{App, AppMode, ContactField, Screen, SubmitState};
use crate::domain::models::{Product, format_price};

/// Renders one frame: header, the current screen, the status bar, and any
/// overlays (toasts, the cookie popup, the help popup).
pub fn render_ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.area());

    render_header(f, app, chunks[0]);

    match app.screen {
        Screen::Home => render_home(f, app, chunks[1]),
        Screen::Shop => render_shop(f, app, chunks[1]),
        Screen::Cart => render_cart(f, app, chunks[1]),
        Screen::Contact => render_contact(f, app, chunks[1]),
    }

    render_status_bar(f, app, chunks[2]);
    render_notifications(f, app);

    if app.cookie_popup_visible {
        render_cookie_popup(f);
    }
    if app.mode == AppMode::Help {
        render_help_popup(f, app);
    }
}

fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![
        Span::styled(
            " tshop ",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
    ];

    for (i, screen) in [Screen::Home, Screen::Shop, Screen::Cart, Screen::Contact]
        .into_iter()
        .enumerate()
    {
        let style = if screen == app.screen {
            Style::default().fg(Color::Black).bg(Color::Yellow)
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(format!(" {}:{} ", i + 1, screen.title()), style));
    }

    spans.push(Span::raw("  "));
    spans.push(Span::styled(
        format!("Cart ({})", app.cart.item_count()),
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD),
    ));

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_home(f: &mut Frame, app: &App, area: Rect) {
    let outer = Block::default()
        .borders(Borders::ALL)
        .title("Featured Products");
    let inner = outer.inner(area);
    f.render_widget(outer, area);

    let featured = app.featured();
    if featured.is_empty() {
        let empty = Paragraph::new("The catalog is empty.").alignment(Alignment::Center);
        f.render_widget(empty, inner);
        return;
    }

    let constraints: Vec<Constraint> = featured
        .iter()
        .map(|_| Constraint::Ratio(1, featured.len() as u32))
        .collect();
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(inner);

    for (i, product) in featured.iter().enumerate() {
        render_product_card(f, product, cards[i], i == app.home_selected);
    }
}

fn render_product_card(f: &mut Frame, product: &Product, area: Rect, selected: bool) {
    let border_style = if selected {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(product.badge.clone());

    let lines = vec![
        Line::from(Span::styled(
            product.name.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format_price(product.price),
            Style::default().fg(Color::Green),
        )),
        Line::from(Span::styled(
            product.category.clone(),
            Style::default().fg(Color::Cyan),
        )),
        Line::from(Span::styled(
            product.image.clone(),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
        Line::from(product.description.clone()),
    ];

    let card = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
    f.render_widget(card, area);
}

fn render_shop(f: &mut Frame, app: &App, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let searching = app.mode == AppMode::Search;
    let border_style = if searching {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let search = Paragraph::new(app.search_query.as_str()).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Search")
            .border_style(border_style),
    );
    f.render_widget(search, rows[0]);
    if searching {
        f.set_cursor_position((input_cursor_x(rows[0], app.cursor_position), rows[0].y + 1));
    }

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(rows[1]);

    render_shop_table(f, app, columns[0]);
    render_shop_detail(f, app, columns[1]);
}

fn render_shop_table(f: &mut Frame, app: &App, area: Rect) {
    let listing = app.shop_listing();

    let header = Row::new(vec!["Name", "Price", "Category", "Badge"])
        .style(Style::default().add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = listing
        .iter()
        .enumerate()
        .map(|(i, product)| {
            let style = if i == app.shop_selected {
                Style::default().fg(Color::Black).bg(Color::Yellow)
            } else {
                Style::default()
            };
            Row::new(vec![
                Cell::from(product.name.clone()),
                Cell::from(format_price(product.price)),
                Cell::from(product.category.clone()),
                Cell::from(product.badge.clone()),
            ])
            .style(style)
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(40),
            Constraint::Percentage(15),
            Constraint::Percentage(25),
            Constraint::Percentage(20),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Products ({})", listing.len())),
    );
    f.render_widget(table, area);
}

fn render_shop_detail(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title("Details");

    let Some(product) = app.selected_shop_product() else {
        let empty = Paragraph::new("No products match the search.")
            .block(block)
            .wrap(Wrap { trim: true });
        f.render_widget(empty, area);
        return;
    };

    let image = app.screen.image_base().rebase(&product.image);
    let lines = vec![
        Line::from(Span::styled(
            product.name.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format_price(product.price),
            Style::default().fg(Color::Green),
        )),
        Line::from(Span::styled(
            product.category.clone(),
            Style::default().fg(Color::Cyan),
        )),
        Line::from(Span::styled(
            product.badge.clone(),
            Style::default().fg(Color::Magenta),
        )),
        Line::from(Span::styled(image, Style::default().fg(Color::DarkGray))),
        Line::from(""),
        Line::from(product.description.clone()),
    ];

    let detail = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
    f.render_widget(detail, area);
}

fn render_cart(f: &mut Frame, app: &App, area: Rect) {
    if app.cart.is_empty() {
        let empty = Paragraph::new("Your cart is empty.")
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title("Your Cart"));
        f.render_widget(empty, area);
        return;
    }

    let rows_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(area);

    let header = Row::new(vec!["Product", "Price", "Qty", "Line Total"])
        .style(Style::default().add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = app
        .cart
        .lines()
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let selected = i == app.cart_selected;
            let editing = selected && app.mode == AppMode::Editing;
            let style = if selected {
                Style::default().fg(Color::Black).bg(Color::Yellow)
            } else {
                Style::default()
            };
            let qty = if editing {
                Cell::from(format!("[{}]", app.quantity_input))
                    .style(Style::default().add_modifier(Modifier::BOLD))
            } else {
                Cell::from(line.quantity.to_string())
            };
            Row::new(vec![
                Cell::from(line.product.name.clone()),
                Cell::from(format_price(line.product.price)),
                qty,
                Cell::from(format_price(line.line_total())),
            ])
            .style(style)
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(45),
            Constraint::Percentage(18),
            Constraint::Percentage(12),
            Constraint::Percentage(25),
        ],
    )
    .header(header)
    .block(Block::default().borders(Borders::ALL).title("Your Cart"));
    f.render_widget(table, rows_areas[0]);

    let summary = Paragraph::new(Line::from(vec![
        Span::raw(format!("Items: {}", app.cart.item_count())),
        Span::raw("    "),
        Span::styled(
            format!("Total: {}", format_price(app.cart.total())),
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ),
    ]))
    .block(Block::default().borders(Borders::ALL).title("Total"));
    f.render_widget(summary, rows_areas[1]);
}

fn render_contact(f: &mut Frame, app: &App, area: Rect) {
    let outer = Block::default().borders(Borders::ALL).title("Contact Us");
    let inner = outer.inner(area);
    f.render_widget(outer, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(inner);

    render_contact_field(f, app, rows[0], ContactField::Name, "Name", &app.contact.name);
    render_contact_field(f, app, rows[1], ContactField::Email, "Email", &app.contact.email);
    render_contact_field(
        f,
        app,
        rows[2],
        ContactField::Message,
        "Message",
        &app.contact.message,
    );
    render_submit_button(f, app, rows[3]);
}

fn render_contact_field(
    f: &mut Frame,
    app: &App,
    area: Rect,
    field: ContactField,
    label: &str,
    value: &str,
) {
    let focused = app.contact.focus == field;
    let editing = focused && app.mode == AppMode::Editing;
    let border_style = if editing {
        Style::default().fg(Color::Green)
    } else if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };

    let widget = Paragraph::new(value)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(label)
                .border_style(border_style),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(widget, area);

    if editing {
        f.set_cursor_position((input_cursor_x(area, app.cursor_position), area.y + 1));
    }
}

fn render_submit_button(f: &mut Frame, app: &App, area: Rect) {
    let focused = app.contact.focus == ContactField::Submit;
    let label_style = match app.contact.submit {
        SubmitState::Idle => Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
        SubmitState::Sending { .. } => Style::default().fg(Color::DarkGray),
        SubmitState::Sent { .. } => Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD),
    };
    let border_style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };

    let button = Paragraph::new(Span::styled(app.contact.submit.label(), label_style))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style),
        );
    f.render_widget(button, area);
}

fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let (label, color) = match app.mode {
        AppMode::Normal => ("NORMAL", Color::Blue),
        AppMode::Search => ("SEARCH", Color::Yellow),
        AppMode::Editing => ("EDIT", Color::Green),
        AppMode::Help => ("HELP", Color::Magenta),
    };

    let mut spans = Vec::new();
    if let Some(message) = &app.status_message {
        spans.push(Span::styled(
            message.clone(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::raw("  "));
    }
    spans.push(Span::styled(
        status_hints(app),
        Style::default().fg(Color::Gray),
    ));

    let bar = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(label)
            .border_style(Style::default().fg(color)),
    );
    f.render_widget(bar, area);
}

fn status_hints(app: &App) -> String {
    match app.mode {
        AppMode::Normal => {
            if app.cookie_popup_visible {
                return "y: accept cookies  n: decline".to_string();
            }
            match app.screen {
                Screen::Home => "1-4: pages  Tab: next page  j/k: select  Enter: add to cart  ?: help  q: quit",
                Screen::Shop => "/: search  j/k: select  Enter: add to cart  ?: help  q: quit",
                Screen::Cart => "Enter/e: edit quantity  +/-: adjust  x: remove  c: clear  ?: help  q: quit",
                Screen::Contact => "j/k: move  Enter: edit field or send  ?: help  q: quit",
            }
            .to_string()
        }
        AppMode::Search => "type to filter  Enter: keep filter  Esc: clear".to_string(),
        AppMode::Editing => "Enter: apply  Esc: cancel".to_string(),
        AppMode::Help => "j/k: scroll  Esc: close".to_string(),
    }
}

fn render_notifications(f: &mut Frame, app: &App) {
    let area = f.area();
    let height = 3u16;

    for (i, notification) in app.notifications.iter().enumerate() {
        let width = (notification.message.chars().count() as u16 + 4).min(area.width);
        let y = area.y + 1 + i as u16 * height;
        if y.saturating_add(height) > area.y + area.height {
            break;
        }
        let rect = Rect {
            x: area.x + area.width.saturating_sub(width + 1),
            y,
            width,
            height,
        };

        let toast = Paragraph::new(notification.message.as_str())
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Black).bg(Color::Green))
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(Clear, rect);
        f.render_widget(toast, rect);
    }
}

fn render_cookie_popup(f: &mut Frame) {
    let area = centered_rect(50, 25, f.area());
    f.render_widget(Clear, area);

    let lines = vec![
        Line::from("We use cookies to ensure you get the best"),
        Line::from("experience on our website."),
        Line::from(""),
        Line::from(vec![
            Span::styled(
                "[y] Accept",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("   "),
            Span::styled(
                "[n] Decline",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
        ]),
    ];

    let popup = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Cookies")
                .border_style(Style::default().fg(Color::Yellow)),
        );
    f.render_widget(popup, area);
}

fn render_help_popup(f: &mut Frame, app: &App) {
    let area = centered_rect(70, 70, f.area());
    f.render_widget(Clear, area);

    let help = Paragraph::new(help_text())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Help")
                .border_style(Style::default().fg(Color::Magenta)),
        )
        .scroll((app.help_scroll, 0))
        .wrap(Wrap { trim: false });
    f.render_widget(help, area);
}

pub fn help_text() -> String {
    [
        "Key reference",
        "",
        "Global",
        "  1/2/3/4         go to Home / Shop / Cart / Contact",
        "  Tab, Shift+Tab  next / previous page",
        "  j/k or arrows   move the selection",
        "  ?               open this help",
        "  q               quit",
        "",
        "Home",
        "  Enter           add the highlighted featured product to the cart",
        "",
        "Shop",
        "  /               filter products by name, category or description",
        "  Enter           add the highlighted product to the cart",
        "",
        "Cart",
        "  Enter or e      edit the highlighted quantity (0 removes the line)",
        "  + / -           adjust the quantity by one",
        "  x or Delete     remove the highlighted line",
        "  c               clear the cart",
        "",
        "Contact",
        "  Enter           edit the focused field, or send on the button",
        "",
        "Cookies",
        "  y / n           accept or decline when the popup is shown",
    ]
    .join("\n")
}

fn input_cursor_x(area: Rect, cursor: usize) -> u16 {
    let max = area.x + area.width.saturating_sub(2);
    area.x
        .saturating_add(1)
        .saturating_add(cursor.min(u16::MAX as usize) as u16)
        .min(max)
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
