//! HTML rendering for the pages produced by `logic`.
//!
//! Every page can be rendered as a bare fragment (HTMX swaps into `#content`)
//! or wrapped in the full layout. All interpolated text goes through
//! `escape_html`.

use crate::logic::{Countdown, HomeStatus, Page, ProgressMessage, RiddleView};
use crate::util::{escape_html, format_countdown};

const SITE_TITLE: &str = "Mystery Box";
const HOME_TITLE: &str = "Jouons à un petit jeu !";
const HTMX_SRC: &str = "https://unpkg.com/htmx.org@2.0.4/dist/htmx.min.js";
const HOME_TEXT: &str = "Trouve toutes les énigmes pour ouvrir cette boîte mystérieuse.";

/// Render `page`; `fragment` skips the surrounding layout.
pub fn render(page: &Page, fragment: bool) -> String {
  let (class, body) = match page {
    Page::Home(status) => ("homepage", home(status)),
    Page::Riddle(view) => ("riddle", riddle(view)),
    Page::Locked { index, countdown } => ("locked", locked(*index, countdown)),
    Page::End => ("end", end()),
  };
  if fragment { body } else { layout(class, &body) }
}

fn layout(class: &str, content: &str) -> String {
  format!(
    r#"<!DOCTYPE html>
<html lang="fr">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{title}</title>
  <link rel="stylesheet" href="/assets/style.css">
  <script src="{htmx}" defer></script>
</head>
<body class="{class}">
  <main id="content">
{content}
  </main>
</body>
</html>
"#,
    title = SITE_TITLE,
    htmx = HTMX_SRC,
    class = escape_html(class),
    content = content,
  )
}

fn countdown(label: &str, c: &Countdown) -> String {
  format!(
    r#"<p class="countdown">{label} <time datetime="{at}">{left}</time></p>"#,
    label = escape_html(label),
    at = c.at.to_rfc3339(),
    left = format_countdown(c.remaining),
  )
}

fn home(status: &HomeStatus) -> String {
  let action = match status {
    HomeStatus::NotStarted(c) => countdown("Le jeu commence dans", c),
    HomeStatus::Open { current, countdown: next } => {
      let mut s = format!(
        r##"<a class="button" href="/riddles/{i}" hx-get="/riddles/{i}" hx-target="#content" hx-push-url="true">Voir l'énigme de la semaine</a>"##,
        i = current,
      );
      if let Some(c) = next {
        s.push_str(&countdown("Prochaine énigme dans", c));
      }
      s
    }
  };
  format!(
    "<section class=\"home\">\n<h1>{}</h1>\n<p>{}</p>\n{}\n</section>",
    escape_html(HOME_TITLE),
    escape_html(HOME_TEXT),
    action,
  )
}

fn message_text(m: ProgressMessage) -> &'static str {
  match m {
    ProgressMessage::WrongAnswer => "Mauvaise réponse, essaie encore.",
    ProgressMessage::NoAnswerConfigured => "Aucune réponse configurée pour cette énigme.",
    ProgressMessage::SolvedWaiting => "Bonne réponse ! La prochaine énigme n'est pas encore disponible.",
  }
}

fn riddle(v: &RiddleView) -> String {
  let mut out = format!(
    "<section class=\"riddle\" data-index=\"{i}\">\n<h1>{title}</h1>\n<p class=\"text\">{body}</p>\n",
    i = v.index,
    title = escape_html(&v.title),
    body = escape_html(&v.body),
  );
  if let Some(m) = v.message {
    out.push_str(&format!("<p class=\"message\">{}</p>\n", escape_html(message_text(m))));
  }
  out.push_str(&format!(
    r##"<form method="post" action="/riddles/{i}/answer" hx-post="/riddles/{i}/answer" hx-target="#content">
<input type="text" name="answer" autocomplete="off" required>
<button type="submit">Valider</button>
</form>
"##,
    i = v.index,
  ));
  if let Some(c) = &v.countdown {
    out.push_str(&countdown("Prochaine énigme dans", c));
    out.push('\n');
  }
  out.push_str("</section>");
  out
}

fn locked(index: Option<usize>, c: &Countdown) -> String {
  let (title, label) = match index {
    None => ("Patience…", "Le jeu commence dans"),
    Some(_) => ("Cette énigme est encore verrouillée", "Elle s'ouvre dans"),
  };
  format!(
    "<section class=\"locked\">\n<h1>{}</h1>\n{}\n<a href=\"/home\">Retour</a>\n</section>",
    escape_html(title),
    countdown(label, c),
  )
}

fn end() -> String {
  "<section class=\"end\">\n<h1>Bravo !</h1>\n<p>Tu as résolu toutes les énigmes. La boîte est à toi.</p>\n</section>".to_string()
}
