use crate::application::{App, Screen};
use crate::domain::TokenId;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap},
    Frame,
};

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
    match &app.screen {
        Screen::Explore => render_feed(f, app, chunks[1]),
        Screen::SignIn => render_sign_in(f, app, chunks[1]),
        Screen::Collection => render_collection(f, app, chunks[1]),
        Screen::Detail(token_id) => render_detail(f, app, chunks[1], *token_id),
        Screen::Receipt(token_id) => render_receipt(f, app, chunks[1], *token_id),
        Screen::RecipeMetadata => render_recipe_metadata(f, app, chunks[1]),
        Screen::MintSuccess(confirmation) => {
            render_message(f, chunks[1], "Minted", format!("Mint confirmed: {confirmation}"))
        }
    }
    render_status_bar(f, app, chunks[2]);
}

fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let state = app.explore().state();
    let filter = state.selected_filter.as_deref().unwrap_or("All");
    let account = if app.is_authenticated() { "signed in" } else { "guest" };
    let header = Paragraph::new(format!("duckee | {account} | Filter: {filter}"))
        .style(Style::default().fg(Color::Cyan));
    f.render_widget(header, area);
}

fn render_feed(f: &mut Frame, app: &App, area: Rect) {
    let state = app.explore().state();
    if state.is_loading {
        render_message(f, area, "Explore", "Loading...".to_string());
        return;
    }

    let header = Row::new(vec!["Token", "Price", "Liked", "Owner"])
        .style(Style::default().fg(Color::Yellow))
        .height(1);

    let rows = state.feeds.iter().enumerate().map(|(index, item)| {
        let price = if item.is_open_source() {
            "open source".to_string()
        } else {
            format!("{:.2} FLOW", item.price_in_flow)
        };
        let style = if index == app.selected {
            Style::default().bg(Color::Blue).fg(Color::White)
        } else {
            Style::default()
        };
        Row::new(vec![
            Cell::from(format!("#{}", item.token_id)),
            Cell::from(price),
            Cell::from(if item.liked { "♥" } else { " " }),
            Cell::from(item.owner.nickname.clone()),
        ])
        .style(style)
    });

    let title = if state.has_next { "Explore" } else { "Explore (end)" };
    let table = Table::new(
        rows,
        [
            Constraint::Length(8),
            Constraint::Length(14),
            Constraint::Length(5),
            Constraint::Min(10),
        ],
    )
    .header(header)
    .block(Block::default().borders(Borders::ALL).title(title))
    .column_spacing(1);

    f.render_widget(table, area);
}

fn render_sign_in(f: &mut Frame, app: &App, area: Rect) {
    let text = if app.sign_in().state().is_loading {
        "Signing in...".to_string()
    } else {
        format!(
            "Open {} in a browser, then copy the redirect URI and press p.",
            app.auth_url()
        )
    };
    render_message(f, area, "Sign in", text);
}

fn render_collection(f: &mut Frame, app: &App, area: Rect) {
    let text = match app.collection().state().user {
        Some(user) => format!(
            "{}\n{}\n\nRecipes: {}  Following: {}  Followers: {}",
            user.nickname, user.address, user.art_count, user.following_count, user.follower_count
        ),
        None if app.is_authenticated() => "Loading profile...".to_string(),
        None => "Sign in to see your collection.".to_string(),
    };
    render_message(f, area, "Collection", text);
}

fn render_detail(f: &mut Frame, app: &App, area: Rect, token_id: TokenId) {
    let title = format!("Artwork #{token_id}");
    let Some(state) = app.detail().map(|detail| detail.state()) else {
        return;
    };
    let Some(details) = state.details else {
        let text = if state.is_loading { "Loading..." } else { "Artwork unavailable." };
        render_message(f, area, &title, text.to_string());
        return;
    };

    let mut lines = vec![
        format!("Owner: {} ({})", details.owner.nickname, details.owner.address),
        if details.is_open_source() {
            "Price: open source".to_string()
        } else {
            format!("Price: {:.2} FLOW", details.price_in_flow)
        },
        format!("Royalty: {}%", details.royalty_fee),
        format!("Liked: {}", if details.liked { "yes" } else { "no" }),
    ];
    if let Some(description) = &details.description {
        lines.push(format!("\n{description}"));
    }
    match &details.recipe {
        Some(recipe) => {
            lines.push(format!("\nModel: {}", recipe.model_name));
            lines.push(format!("Prompt: {}", recipe.prompt));
            lines.push(format!("Size: {}x{}", recipe.size_width, recipe.size_height));
        }
        None => lines.push("\nRecipe hidden until purchased.".to_string()),
    }
    render_message(f, area, &title, lines.join("\n"));
}

fn render_receipt(f: &mut Frame, app: &App, area: Rect, token_id: TokenId) {
    let details = app.detail().and_then(|detail| detail.state().details);
    let text = match details {
        Some(details) if details.is_open_source() => {
            format!("Artwork #{token_id} is open source. Press m to mint a remix of its recipe.")
        }
        Some(details) => format!(
            "Artwork #{token_id}: {:.2} FLOW, {}% royalty to {}.\nPress m to mint a remix of its recipe.",
            details.price_in_flow, details.royalty_fee, details.owner.nickname
        ),
        None => format!("Artwork #{token_id}"),
    };
    render_message(f, area, "Receipt", text);
}

fn render_recipe_metadata(f: &mut Frame, app: &App, area: Rect) {
    let Some(mint) = app.mint() else {
        return;
    };
    let state = mint.state();
    let mut lines = vec![
        format!("Prompt: {}", state.recipe.prompt),
        format!("For sale: {}", state.for_sale),
        format!("Price: {:.2} FLOW", state.price_in_flow),
        format!("Royalty: {}%", state.royalty_fee),
    ];
    match mint.mint_url() {
        Ok(url) => lines.push(format!("Mint at: {url}")),
        Err(err) => lines.push(format!("Mint unavailable: {err}")),
    }
    if state.is_uploading {
        lines.push("Uploading...".to_string());
    }
    render_message(f, area, "Mint", lines.join("\n"));
}

fn render_message(f: &mut Frame, area: Rect, title: &str, text: String) {
    let paragraph = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title(title.to_string()));
    f.render_widget(paragraph, area);
}

fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let text = match (&app.status_message, &app.screen) {
        (Some(status), _) => status.clone(),
        (None, Screen::Explore) => {
            "j/k: move | l: like | Enter: open | f: filter | c: collection | s: sign in | o: sign out | p: paste redirect | q: quit".to_string()
        }
        (None, Screen::SignIn) => "p: paste redirect | Esc: back".to_string(),
        (None, Screen::RecipeMetadata) => {
            "n: for sale | o: open source | +/-: price | [/]: royalty | y: copy mint URL | p: paste redirect | Esc: back".to_string()
        }
        (None, Screen::Collection) => "o: sign out | Esc: back".to_string(),
        (None, Screen::Detail(_)) => "b: buy or try | m: remix | Esc: back".to_string(),
        (None, Screen::Receipt(_)) => "m: remix | Esc: back".to_string(),
        (None, _) => "Esc: back".to_string(),
    };
    let status = Paragraph::new(text)
        .style(Style::default().fg(Color::Green))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(status, area);
}
