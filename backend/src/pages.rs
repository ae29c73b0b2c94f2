use std::fmt::Write;

use game_core::Game;

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!doctype html>\n<html>\n<head><meta charset=\"utf-8\"><title>{}</title></head>\n\
         <body>\n{body}\n</body>\n</html>\n",
        escape(title)
    )
}

pub fn index() -> String {
    layout(
        "Pick a Prize",
        "<h1>Pick a Prize</h1>\n\
         <p>Create a game with up to four prize options and share the link.\n\
         Whoever opens it picks one option, exactly once. No take-backs.</p>\n\
         <p><a href=\"/create\">Create a game</a></p>",
    )
}

pub fn create_form() -> String {
    layout(
        "Create a game",
        "<h1>Create a game</h1>\n\
         <form method=\"post\" action=\"/create\">\n\
         <p><label>Title <input name=\"title\"></label></p>\n\
         <p><label>Your email <input name=\"creator_contact\" type=\"email\"></label></p>\n\
         <p><label>Option 1 <input name=\"option_1\"></label></p>\n\
         <p><label>Option 2 <input name=\"option_2\"></label></p>\n\
         <p><label>Option 3 <input name=\"option_3\"></label></p>\n\
         <p><label>Option 4 <input name=\"option_4\"></label></p>\n\
         <p><button type=\"submit\">Create</button></p>\n\
         </form>",
    )
}

pub fn game(game: &Game) -> String {
    let body = match game.chosen_option() {
        Some(selected) => format!(
            "<h1>{}</h1>\n\
             <p>The choice has been made: <strong>{}</strong></p>\n\
             <p>This result is final.</p>",
            escape(&game.title),
            escape(selected)
        ),
        None => {
            let mut buttons = String::new();
            for (index, option) in game.options.iter().enumerate() {
                let _ = write!(
                    buttons,
                    "<p><button type=\"submit\" name=\"chosen_index\" value=\"{index}\">{}</button></p>\n",
                    escape(option)
                );
            }
            format!(
                "<h1>{}</h1>\n\
                 <p>Pick one option. The first pick is final.</p>\n\
                 <form method=\"post\" action=\"/game/{}\">\n{buttons}</form>",
                escape(&game.title),
                game.id
            )
        }
    };
    layout(&game.title, &body)
}

pub fn list(games: &[Game]) -> String {
    let mut items = String::new();
    for game in games {
        let status = match game.chosen_option() {
            Some(selected) => format!("revealed: {}", escape(selected)),
            None => "open".to_string(),
        };
        let _ = write!(
            items,
            "<li><a href=\"/game/{}\">{}</a> &mdash; {status}</li>\n",
            game.id,
            escape(&game.title)
        );
    }
    layout(
        "All games",
        &format!("<h1>All games</h1>\n<ul>\n{items}</ul>"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_core::{ChoiceState, Game};

    fn sample() -> Game {
        Game {
            id: "abc".to_string(),
            title: "Gift <3".to_string(),
            creator_contact: None,
            options: vec!["Book & Pen".to_string(), "Mug".to_string()],
            choice: ChoiceState::Open,
        }
    }

    #[test]
    fn escapes_markup_in_user_text() {
        assert_eq!(escape("a<b>&\"c\"'d'"), "a&lt;b&gt;&amp;&quot;c&quot;&#39;d&#39;");
    }

    #[test]
    fn open_game_renders_one_button_per_option() {
        let page = game(&sample());
        assert!(page.contains("action=\"/game/abc\""));
        assert!(page.contains("value=\"0\">Book &amp; Pen</button>"));
        assert!(page.contains("value=\"1\">Mug</button>"));
    }

    #[test]
    fn revealed_game_renders_result_without_form() {
        let mut decided = sample();
        decided.choice = ChoiceState::Revealed { index: 1 };
        let page = game(&decided);
        assert!(page.contains("<strong>Mug</strong>"));
        assert!(!page.contains("<form"));
    }
}
