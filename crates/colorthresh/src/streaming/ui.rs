use axum::{
    http::{header, StatusCode},
    response::IntoResponse,
};

pub async fn index_page() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/html")],
        r#"<!DOCTYPE html>
        <html lang="en">
        <head>
            <meta charset="UTF-8">
            <meta name="viewport" content="width=device-width, initial-scale=1.0">
            <title>colorthresh</title>
            <style>
                * { margin: 0; padding: 0; box-sizing: border-box; }

                body {
                    background: #fff;
                    color: #000;
                    font-family: monospace;
                    height: 100vh;
                    overflow: hidden;
                }

                .wrapper { height: 100vh; display: flex; flex-direction: column; }

                .header-bar {
                    padding: 15px 20px;
                    border-bottom: 2px solid #000;
                    display: flex;
                    justify-content: space-between;
                    align-items: center;
                }

                .brand { font-weight: 700; font-size: 1.2rem; letter-spacing: -1px; }

                .space {
                    display: flex;
                    gap: 8px;
                    align-items: center;
                }

                .space-name {
                    min-width: 80px;
                    text-align: center;
                    font-weight: 700;
                }

                button {
                    background: #000;
                    color: #fff;
                    border: none;
                    padding: 8px 16px;
                    font-family: monospace;
                    font-size: 0.8rem;
                    cursor: pointer;
                }

                button:hover { background: #333; }

                .main {
                    flex: 1;
                    display: grid;
                    grid-template-columns: 320px 1fr;
                }

                .sidebar {
                    border-right: 2px solid #000;
                    padding: 20px;
                    overflow-y: auto;
                }

                .section-head {
                    font-size: 0.7rem;
                    font-weight: 700;
                    text-transform: uppercase;
                    letter-spacing: 1px;
                    margin-bottom: 15px;
                    padding-bottom: 8px;
                    border-bottom: 1px solid #000;
                }

                .slider { margin-bottom: 14px; }

                .slider-label {
                    display: flex;
                    justify-content: space-between;
                    font-size: 0.65rem;
                    text-transform: uppercase;
                    margin-bottom: 4px;
                }

                .slider input { width: 100%; }

                .content-area {
                    display: grid;
                    grid-template-columns: repeat(2, 1fr);
                    gap: 2px;
                    background: #000;
                    padding: 2px;
                }

                .feed {
                    background: #fff;
                    position: relative;
                    display: flex;
                    align-items: center;
                    justify-content: center;
                }

                .feed-title {
                    position: absolute;
                    top: 10px;
                    left: 10px;
                    font-size: 0.65rem;
                    font-weight: 700;
                    text-transform: uppercase;
                    background: #fff;
                    padding: 4px 8px;
                    border: 1px solid #000;
                }

                .feed img { width: 100%; height: 100%; object-fit: contain; }
            </style>
        </head>
        <body>
            <div class="wrapper">
                <div class="header-bar">
                    <div class="brand">COLORTHRESH</div>
                    <div class="space">
                        <button id="prev_btn">&lt;</button>
                        <div class="space-name" id="space_name">-</div>
                        <button id="next_btn">&gt;</button>
                        <button id="quit_btn">QUIT</button>
                    </div>
                </div>

                <div class="main">
                    <div class="sidebar">
                        <div class="section-head">Channel Bounds</div>
                        <div id="sliders"></div>
                    </div>

                    <div class="content-area">
                        <div class="feed">
                            <div class="feed-title">CONVERTED</div>
                            <img src="/stream/converted" alt="Converted">
                        </div>
                        <div class="feed">
                            <div class="feed-title">MASK</div>
                            <img src="/stream/mask" alt="Mask">
                        </div>
                    </div>
                </div>
            </div>

            <script>
                const sliders = document.getElementById('sliders');
                const inputs = {};

                // One row per (channel, edge), ch0 low first.
                for (const slot of [0, 1, 2]) {
                    for (const edge of ['low', 'high']) {
                        const id = `ch${slot}_${edge}`;
                        const row = document.createElement('div');
                        row.className = 'slider';
                        row.innerHTML = `<div class="slider-label"><span>Ch ${slot} ${edge}</span><span id="${id}_val"></span></div>
                            <input type="range" min="0" max="255" id="${id}">`;
                        sliders.appendChild(row);

                        const input = row.querySelector('input');
                        input.addEventListener('input', () => {
                            document.getElementById(`${id}_val`).textContent = input.value;
                            post('/bound', { slot, edge, value: parseInt(input.value, 10) });
                        });
                        inputs[id] = input;
                    }
                }

                async function post(path, body) {
                    try {
                        await fetch(path, {
                            method: 'POST',
                            headers: { 'Content-Type': 'application/json' },
                            body: JSON.stringify(body || {})
                        });
                    } catch (e) { console.error("Control error", e); }
                }

                async function loadState() {
                    try {
                        const res = await fetch('/state');
                        const state = await res.json();
                        document.getElementById('space_name').textContent = state.colorspace;
                        state.bounds.forEach((b, slot) => {
                            for (const edge of ['low', 'high']) {
                                const id = `ch${slot}_${edge}`;
                                if (document.activeElement !== inputs[id]) {
                                    inputs[id].value = b[edge];
                                    document.getElementById(`${id}_val`).textContent = b[edge];
                                }
                            }
                        });
                    } catch (e) { console.error("State load error", e); }
                }

                document.getElementById('prev_btn').addEventListener('click', () => post('/cycle', { direction: -1 }));
                document.getElementById('next_btn').addEventListener('click', () => post('/cycle', { direction: 1 }));
                document.getElementById('quit_btn').addEventListener('click', () => post('/quit'));

                loadState();
                setInterval(loadState, 500);
            </script>
        </body>
        </html>
"#,
    )
}
