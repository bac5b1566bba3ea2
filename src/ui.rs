use crate::day_key::DayKey;
use crate::store::RoutineStore;

pub fn render_index(store: &RoutineStore) -> String {
    let today = store.today();
    let items: String = store
        .routines()
        .iter()
        .map(|routine| {
            let done = store.is_completed(routine.id, &today);
            let streak = store
                .current_streak(routine, &today)
                .map(|streak| streak.length)
                .unwrap_or(0);
            let selected = if store.selected() == Some(routine.id) { " selected" } else { "" };
            format!(
                r#"<li class="routine{selected}{done_class}" data-id="{id}">
          <button class="toggle" aria-pressed="{done}">{mark}</button>
          <span class="title">{title}</span>
          <span class="streak">{streak} day streak</span>
        </li>"#,
                id = routine.id,
                done_class = if done { " done" } else { "" },
                mark = if done { "&#10003;" } else { "&#9675;" },
                title = escape_html(&routine.title),
            )
        })
        .collect();

    INDEX_HTML
        .replace("{{DATE}}", DayKey::from_day(today).as_str())
        .replace("{{COMPLETED}}", &store.completed_count(&today).to_string())
        .replace("{{TOTAL}}", &store.len().to_string())
        .replace("{{ROUTINES}}", &items)
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
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

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Routines</title>
  <style>
    :root {
      --bg: #f8f3e6;
      --ink: #2b2a28;
      --accent: #ff6b4a;
      --card: rgba(255, 255, 255, 0.86);
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--bg);
      color: var(--ink);
      font-family: "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
    }

    .app {
      width: min(640px, 100%);
      background: var(--card);
      border-radius: 24px;
      padding: 32px;
      display: grid;
      gap: 20px;
    }

    ul {
      list-style: none;
      padding: 0;
      margin: 0;
      display: grid;
      gap: 8px;
    }

    .routine {
      display: flex;
      align-items: center;
      gap: 12px;
    }

    .routine.selected .title {
      font-weight: 600;
    }

    .routine.done .toggle {
      color: var(--accent);
    }

    .streak {
      margin-left: auto;
      opacity: 0.6;
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>Routines</h1>
      <p>{{DATE}} &middot; {{COMPLETED}} of {{TOTAL}} done</p>
    </header>
    <form id="add-form">
      <input id="title" name="title" placeholder="New routine" autocomplete="off" />
      <button type="submit">Add</button>
    </form>
    <ul id="routines">
        {{ROUTINES}}
    </ul>
  </main>
  <script>
    document.querySelectorAll('.routine .toggle').forEach((button) => {
      button.addEventListener('click', async () => {
        const id = button.closest('.routine').dataset.id;
        await fetch(`/api/routines/${id}/toggle`, { method: 'POST' });
        window.location.reload();
      });
    });

    document.getElementById('add-form').addEventListener('submit', async (event) => {
      event.preventDefault();
      const title = document.getElementById('title').value;
      const res = await fetch('/api/routines', {
        method: 'POST',
        headers: { 'content-type': 'application/json' },
        body: JSON.stringify({ title })
      });
      if (res.ok) {
        window.location.reload();
      }
    });
  </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup_in_titles() {
        assert_eq!(escape_html("<b>\"Tea\" & 'toast'</b>"), "&lt;b&gt;&quot;Tea&quot; &amp; &#39;toast&#39;&lt;/b&gt;");
    }
}
