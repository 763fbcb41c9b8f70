//! SPA bundle serving
//!
//! The single-page UI ships embedded in the binary so the demo runs from a
//! bare `cargo run`. An on-disk directory can override it for local UI work.

use std::path::PathBuf;

use axum::{
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
};

/// SPA bundle handler: disk override with embedded fallback.
pub struct StaticAssets {
    dir: Option<PathBuf>,
}

impl StaticAssets {
    pub fn new(dir: Option<PathBuf>) -> Self {
        Self { dir }
    }

    /// The SPA entry document. Served for `/` and every unmatched route so
    /// client-side navigation survives full-page reloads.
    pub async fn index(&self) -> Response {
        if let Some(dir) = self.dir.as_ref() {
            if let Ok(html) = tokio::fs::read_to_string(dir.join("index.html")).await {
                return Html(html).into_response();
            }
        }
        Html(INDEX_HTML).into_response()
    }

    /// Serve a bundle asset by relative path from the override directory.
    pub async fn serve(&self, path: &str) -> Response {
        let Some(dir) = self.dir.as_ref() else {
            return (StatusCode::NOT_FOUND, "Not found").into_response();
        };

        let rel = path.trim_start_matches('/');
        let requested = dir.join(rel);

        // Prevent path traversal: the canonical target must stay inside dir.
        let Ok(canon_dir) = dir.canonicalize() else {
            return (StatusCode::INTERNAL_SERVER_ERROR, "Bad static dir").into_response();
        };
        let Ok(canon_req) = requested.canonicalize() else {
            return (StatusCode::NOT_FOUND, "Not found").into_response();
        };
        if !canon_req.starts_with(&canon_dir) {
            return (StatusCode::FORBIDDEN, "Forbidden").into_response();
        }

        match tokio::fs::read(&canon_req).await {
            Ok(bytes) => {
                let mime = mime_guess::from_path(rel).first_or_octet_stream();
                (
                    StatusCode::OK,
                    [(header::CONTENT_TYPE, mime.essence_str())],
                    bytes,
                )
                    .into_response()
            }
            Err(_) => (StatusCode::NOT_FOUND, "Not found").into_response(),
        }
    }
}

// ============================================================================
// Embedded SPA
// ============================================================================

/// The prebuilt single-page bundle: login/register views and the task board,
/// wired to the JSON API with plain `fetch`. Element hooks use `data-testid`
/// attributes, which the e2e page objects key on.
const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Taskboard</title>
    <style>
        * {
            margin: 0;
            padding: 0;
            box-sizing: border-box;
        }
        html, body {
            height: 100%;
            background: #1a1a2e;
            color: #e0e0e0;
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
        }
        .view {
            max-width: 640px;
            margin: 0 auto;
            padding: 40px 20px;
        }
        .card {
            background: #16213e;
            border-radius: 8px;
            padding: 24px;
            margin-bottom: 16px;
        }
        h1 {
            color: #e94560;
            font-size: 1.4em;
            margin-bottom: 16px;
        }
        label {
            display: block;
            font-size: 0.85em;
            color: #9aa0b5;
            margin: 10px 0 4px;
        }
        input, select {
            width: 100%;
            padding: 8px 10px;
            border: 1px solid #0f3460;
            border-radius: 4px;
            background: #1a1a2e;
            color: #e0e0e0;
            font-size: 0.95em;
        }
        .btn {
            background: #e94560;
            color: white;
            border: none;
            padding: 8px 16px;
            border-radius: 4px;
            cursor: pointer;
            font-size: 0.9em;
            margin-top: 14px;
        }
        .btn:hover {
            background: #ff6b6b;
        }
        .btn.secondary {
            background: #0f3460;
        }
        .btn.secondary:hover {
            background: #16213e;
        }
        .link {
            color: #4ecca3;
            cursor: pointer;
            font-size: 0.85em;
            margin-top: 12px;
            display: inline-block;
        }
        .error {
            color: #e94560;
            font-size: 0.85em;
            margin-top: 10px;
            min-height: 1.2em;
        }
        .topbar {
            display: flex;
            justify-content: space-between;
            align-items: center;
            margin-bottom: 16px;
        }
        .topbar .who {
            color: #4ecca3;
            font-size: 0.9em;
        }
        .add-row {
            display: flex;
            gap: 8px;
        }
        .add-row input {
            flex: 1;
        }
        .add-row select {
            width: 110px;
        }
        .add-row .btn {
            margin-top: 0;
        }
        ul.tasks {
            list-style: none;
        }
        ul.tasks li {
            display: flex;
            align-items: center;
            gap: 10px;
            padding: 10px 4px;
            border-bottom: 1px solid #0f3460;
        }
        ul.tasks li:last-child {
            border-bottom: none;
        }
        ul.tasks input[type="checkbox"] {
            width: auto;
        }
        .title {
            flex: 1;
        }
        .title.done {
            text-decoration: line-through;
            color: #9aa0b5;
        }
        .pill {
            font-size: 0.7em;
            text-transform: uppercase;
            padding: 2px 8px;
            border-radius: 10px;
            background: #0f3460;
            color: #9aa0b5;
        }
        .pill.high { color: #e94560; }
        .pill.low { color: #4ecca3; }
        .del {
            background: none;
            border: none;
            color: #9aa0b5;
            cursor: pointer;
            font-size: 1em;
        }
        .del:hover { color: #e94560; }
        .empty {
            color: #9aa0b5;
            font-size: 0.9em;
            padding: 12px 4px;
        }
        .hidden { display: none; }
    </style>
</head>
<body>
    <div class="view">
        <!-- Login -->
        <div class="card" id="login-view" data-testid="login-view">
            <h1>Taskboard</h1>
            <label for="login-email">Email</label>
            <input id="login-email" data-testid="login-email" type="email" placeholder="admin@test.com">
            <label for="login-password">Password</label>
            <input id="login-password" data-testid="login-password" type="password" placeholder="admin123">
            <button class="btn" id="login-submit" data-testid="login-submit">Log in</button>
            <div class="error" id="login-error" data-testid="login-error"></div>
            <span class="link" id="show-register" data-testid="show-register">Need an account? Register</span>
        </div>

        <!-- Register -->
        <div class="card hidden" id="register-view" data-testid="register-view">
            <h1>Create account</h1>
            <label for="register-name">Name</label>
            <input id="register-name" data-testid="register-name" type="text">
            <label for="register-email">Email</label>
            <input id="register-email" data-testid="register-email" type="email">
            <label for="register-password">Password</label>
            <input id="register-password" data-testid="register-password" type="password">
            <button class="btn" id="register-submit" data-testid="register-submit">Register</button>
            <div class="error" id="register-error" data-testid="register-error"></div>
            <span class="link" id="show-login" data-testid="show-login">Back to login</span>
        </div>

        <!-- Task board -->
        <div class="card hidden" id="board-view" data-testid="board-view">
            <div class="topbar">
                <h1>Tasks</h1>
                <div>
                    <span class="who" data-testid="user-name"></span>
                    <button class="btn secondary" data-testid="logout-button" id="logout-button">Log out</button>
                </div>
            </div>

            <div class="add-row">
                <input id="new-task-input" data-testid="new-task-input" type="text" placeholder="New task title">
                <select id="new-task-priority" data-testid="new-task-priority">
                    <option value="high">high</option>
                    <option value="medium" selected>medium</option>
                    <option value="low">low</option>
                </select>
                <button class="btn" id="add-task-button" data-testid="add-task-button">Add</button>
            </div>
            <div class="error" id="task-error" data-testid="task-error"></div>

            <label for="search-input">Search</label>
            <input id="search-input" data-testid="search-input" type="text" placeholder="Filter by title">

            <ul class="tasks" id="task-list" data-testid="task-list"></ul>
            <div class="empty hidden" id="empty-state" data-testid="empty-state">No tasks found.</div>
        </div>
    </div>

    <script>
        const api = (path, options = {}) =>
            fetch(path, {
                headers: { 'Content-Type': 'application/json' },
                ...options,
            });

        const el = (id) => document.getElementById(id);

        function show(viewId) {
            for (const id of ['login-view', 'register-view', 'board-view']) {
                el(id).classList.toggle('hidden', id !== viewId);
            }
        }

        function session() {
            const raw = localStorage.getItem('taskboard-user');
            return raw ? JSON.parse(raw) : null;
        }

        // --- Auth ---

        async function login() {
            el('login-error').textContent = '';
            const body = JSON.stringify({
                email: el('login-email').value,
                password: el('login-password').value,
            });
            const resp = await api('/api/login', { method: 'POST', body });
            const data = await resp.json();
            if (!resp.ok) {
                el('login-error').textContent = data.error || 'Login failed';
                return;
            }
            localStorage.setItem('taskboard-token', data.token);
            localStorage.setItem('taskboard-user', JSON.stringify(data.user));
            enterBoard();
        }

        async function register() {
            el('register-error').textContent = '';
            const body = JSON.stringify({
                name: el('register-name').value,
                email: el('register-email').value,
                password: el('register-password').value,
            });
            const resp = await api('/api/register', { method: 'POST', body });
            const data = await resp.json();
            if (!resp.ok) {
                el('register-error').textContent = data.error || 'Registration failed';
                return;
            }
            el('login-email').value = data.user.email;
            el('login-password').value = '';
            show('login-view');
        }

        // Logout is a pure client-side reset; the server keeps no sessions.
        function logout() {
            localStorage.removeItem('taskboard-token');
            localStorage.removeItem('taskboard-user');
            show('login-view');
        }

        // --- Tasks ---

        function renderTasks(tasks) {
            const list = el('task-list');
            list.innerHTML = '';
            el('empty-state').classList.toggle('hidden', tasks.length > 0);
            for (const task of tasks) {
                const li = document.createElement('li');
                li.dataset.testid = `task-${task.id}`;

                const toggle = document.createElement('input');
                toggle.type = 'checkbox';
                toggle.checked = task.completed;
                toggle.dataset.testid = `task-toggle-${task.id}`;
                toggle.addEventListener('change', () => toggleTask(task.id, toggle.checked));

                const title = document.createElement('span');
                title.className = task.completed ? 'title done' : 'title';
                title.dataset.testid = `task-title-${task.id}`;
                title.textContent = task.title;

                const pill = document.createElement('span');
                pill.className = `pill ${task.priority}`;
                pill.dataset.testid = `task-priority-${task.id}`;
                pill.textContent = task.priority;

                const del = document.createElement('button');
                del.className = 'del';
                del.dataset.testid = `task-delete-${task.id}`;
                del.textContent = '✕';
                del.addEventListener('click', () => deleteTask(task.id));

                li.append(toggle, title, pill, del);
                list.appendChild(li);
            }
        }

        async function loadTasks() {
            const q = el('search-input').value.trim();
            const resp = q
                ? await api(`/api/search?q=${encodeURIComponent(q)}`)
                : await api('/api/tasks');
            renderTasks(await resp.json());
        }

        async function addTask() {
            el('task-error').textContent = '';
            const body = JSON.stringify({
                title: el('new-task-input').value,
                priority: el('new-task-priority').value,
            });
            const resp = await api('/api/tasks', { method: 'POST', body });
            if (!resp.ok) {
                const data = await resp.json();
                el('task-error').textContent = data.error || 'Could not add task';
                return;
            }
            el('new-task-input').value = '';
            await loadTasks();
        }

        async function toggleTask(id, completed) {
            await api(`/api/tasks/${id}`, {
                method: 'PUT',
                body: JSON.stringify({ completed }),
            });
            await loadTasks();
        }

        async function deleteTask(id) {
            await api(`/api/tasks/${id}`, { method: 'DELETE' });
            await loadTasks();
        }

        function enterBoard() {
            const user = session();
            el('user-name').textContent = user ? user.name : '';
            show('board-view');
            loadTasks();
        }

        // --- Wiring ---

        el('login-submit').addEventListener('click', login);
        el('login-password').addEventListener('keydown', (e) => {
            if (e.key === 'Enter') login();
        });
        el('register-submit').addEventListener('click', register);
        el('logout-button').addEventListener('click', logout);
        el('add-task-button').addEventListener('click', addTask);
        el('new-task-input').addEventListener('keydown', (e) => {
            if (e.key === 'Enter') addTask();
        });
        el('search-input').addEventListener('input', loadTasks);
        el('show-register').addEventListener('click', () => show('register-view'));
        el('show-login').addEventListener('click', () => show('login-view'));

        if (session()) {
            enterBoard();
        } else {
            show('login-view');
        }
    </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_bundle_carries_the_testid_hooks() {
        for hook in [
            "login-view",
            "login-email",
            "login-password",
            "login-submit",
            "login-error",
            "register-view",
            "board-view",
            "new-task-input",
            "new-task-priority",
            "add-task-button",
            "search-input",
            "task-list",
            "logout-button",
        ] {
            assert!(
                INDEX_HTML.contains(&format!("data-testid=\"{hook}\"")),
                "missing hook: {hook}"
            );
        }
    }

    #[tokio::test]
    async fn missing_override_dir_serves_embedded_index() {
        let assets = StaticAssets::new(None);
        let response = assets.index().await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn assets_without_override_dir_are_not_found() {
        let assets = StaticAssets::new(None);
        let response = assets.serve("app.js").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
