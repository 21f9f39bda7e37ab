use crate::platform::*;
use crate::utils::*;
use clap::Args;
use gloo::events::EventListener;
use gloo::utils::window;
use pairmatch_core as game;
use game::{CardFace, Difficulty, GameSession, SessionConfig};
use wasm_bindgen::JsCast;
use web_sys::{GamepadEvent, HtmlSelectElement};
use yew::prelude::*;

type Session = GameSession<WebScheduler, Screen, NavigatorPads>;

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Msg {
    Flip(usize),
    Tick(game::Tick),
    NewGame,
    SetDifficulty(String),
    PlayAgain,
    ControllerConnected(u32),
    ControllerDisconnected(u32),
}

#[derive(Properties, Clone, PartialEq)]
struct CardProps {
    index: usize,
    cell: CellModel,
    callback: Callback<usize>,
}

#[function_component(CardView)]
fn card_component(props: &CardProps) -> Html {
    use CardFace::*;

    let CardProps {
        index,
        cell,
        callback,
    } = props.clone();

    let mut class = classes!(
        "card",
        match cell.face {
            Hidden => classes!(),
            Preview(_) | Revealed(_) => classes!("flipped"),
            Matched(_) => classes!("flipped", "matched"),
        }
    );
    if cell.locked {
        class.push("locked");
    }
    if cell.selected {
        class.push("selected");
    }

    let onclick = {
        let callback = callback.clone();
        Callback::from(move |_: MouseEvent| {
            log::trace!("card {} click", index);
            callback.emit(index);
        })
    };

    // handled here so the synthetic click that follows does nothing
    let ontouchend = Callback::from(move |e: TouchEvent| {
        e.prevent_default();
        log::trace!("card {} touch", index);
        callback.emit(index);
    });

    html! {
        <div {class} {onclick} {ontouchend}>{cell.symbol.unwrap_or_default()}</div>
    }
}

#[derive(Properties, Clone, PartialEq)]
struct GameOverProps {
    summary: Option<game::GameSummary>,
    onplayagain: Callback<MouseEvent>,
}

#[function_component(GameOverView)]
fn game_over_component(props: &GameOverProps) -> Html {
    let Some(summary) = props.summary.clone() else {
        return html! { <dialog id="game-over"/> };
    };

    html! {
        <dialog id="game-over" open={true}>
            <h2>{"Congratulations!"}</h2>
            <p>{"Attempts: "}<span id="final-attempts">{summary.attempts}</span></p>
            <p>{"Time: "}<span id="final-time">{summary.time}</span></p>
            <button id="play-again-btn" onclick={props.onplayagain.clone()}>{"Play Again"}</button>
        </dialog>
    }
}

#[derive(Args, Properties, Debug, Clone, PartialEq)]
pub(crate) struct GameProps {
    /// Force a seed instead of random
    #[arg(short, long)]
    seed: Option<u64>,

    /// Board size to start with
    #[arg(short, long, default_value_t)]
    difficulty: Difficulty,
}

pub(crate) struct GameView {
    session: Option<Session>,
    _gamepad_listeners: [EventListener; 2],
}

impl GameView {
    fn create_session(ctx: &Context<Self>) -> Option<Session> {
        let props = ctx.props();
        let config = SessionConfig {
            difficulty: props.difficulty,
            seed: props.seed.unwrap_or_else(js_random_seed),
            touch_primary: detect_touch_primary(),
        };
        log::debug!("session config: {:?}", config);

        let scheduler = WebScheduler::new(ctx.link().clone());
        GameSession::new(config, scheduler, Screen::default(), NavigatorPads)
            .map_err(|err| log::error!("failed to start game: {}", err))
            .ok()
    }

    fn create_gamepad_listeners(ctx: &Context<Self>) -> [EventListener; 2] {
        let gamepad_index = |event: &Event| {
            event
                .dyn_ref::<GamepadEvent>()
                .and_then(GamepadEvent::gamepad)
                .map(|gamepad| gamepad.index())
        };

        let link = ctx.link().clone();
        let on_connected = EventListener::new(&window(), "gamepadconnected", move |event| {
            if let Some(index) = gamepad_index(event) {
                link.send_message(Msg::ControllerConnected(index));
            }
        });

        let link = ctx.link().clone();
        let on_disconnected = EventListener::new(&window(), "gamepaddisconnected", move |event| {
            if let Some(index) = gamepad_index(event) {
                link.send_message(Msg::ControllerDisconnected(index));
            }
        });

        [on_connected, on_disconnected]
    }

    fn log_failure(result: game::Result<()>) {
        if let Err(err) = result {
            log::error!("failed to deal a new board: {}", err);
        }
    }
}

impl Component for GameView {
    type Message = Msg;
    type Properties = GameProps;

    fn create(ctx: &Context<Self>) -> Self {
        let session = Self::create_session(ctx);

        // controllers plugged in before the page loaded never fire a connect event
        if let Some(gamepad) = connected_gamepads().next() {
            ctx.link()
                .send_message(Msg::ControllerConnected(gamepad.index()));
        }

        Self {
            session,
            _gamepad_listeners: Self::create_gamepad_listeners(ctx),
        }
    }

    fn update(&mut self, _ctx: &Context<Self>, msg: Self::Message) -> bool {
        use Msg::*;

        let Some(session) = self.session.as_mut() else {
            return false;
        };
        let revision = session.render().revision();

        match msg {
            Flip(index) => {
                log::debug!("flip request: {}", index);
                session.request_flip(index);
            }
            Tick(tick) => session.on_tick(tick),
            NewGame => Self::log_failure(session.start_new_game()),
            SetDifficulty(value) => match value.parse::<Difficulty>() {
                Ok(difficulty) => Self::log_failure(session.configure_difficulty(difficulty)),
                Err(err) => log::warn!("{}: {:?}", err, value),
            },
            PlayAgain => Self::log_failure(session.acknowledge_game_over()),
            ControllerConnected(index) => session.controller_connected(index),
            ControllerDisconnected(index) => session.controller_disconnected(index),
        }

        session.render().revision() != revision
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        use Msg::*;

        let Some(session) = self.session.as_ref() else {
            return html! { <p class="error">{"The game could not be started."}</p> };
        };
        let screen = session.render();
        let difficulty = session.difficulty();

        let cb_difficulty = ctx.link().callback(|e: Event| {
            SetDifficulty(e.target_unchecked_into::<HtmlSelectElement>().value())
        });
        let cb_new_game = ctx.link().callback(|_: MouseEvent| NewGame);
        let cb_play_again = ctx.link().callback(|_: MouseEvent| PlayAgain);
        let cb_flip = ctx.link().callback(Flip);
        // no scrolling or double-tap zoom from presses on the board
        let cb_touch_start = Callback::from(|e: TouchEvent| e.prevent_default());
        let cb_touch_move = Callback::from(|e: TouchEvent| {
            if is_pinch(e.touches().length()) {
                e.prevent_default();
            }
        });

        html! {
            <div class="pairmatch">
                <nav>
                    <select id="difficulty" onchange={cb_difficulty}>
                        {
                            for Difficulty::ALL.into_iter().map(|level| html! {
                                <option value={level.key()} selected={level == difficulty}>
                                    {level.label()}
                                </option>
                            })
                        }
                    </select>
                    <button id="new-game-btn" onclick={cb_new_game}>{"New Game"}</button>
                </nav>
                <aside>
                    <span>{screen.time.label()}{": "}<span id="timer">{screen.time.to_string()}</span></span>
                    <span>{"Attempts: "}<span id="attempts">{screen.attempts}</span></span>
                </aside>
                <div
                    id="game-board"
                    class={classes!("board", format!("cols-{}", screen.cols))}
                    style={format!("grid-template-columns: repeat({}, 1fr)", screen.cols)}
                    ontouchstart={cb_touch_start}
                    ontouchmove={cb_touch_move}
                >
                    {
                        for screen.cells.iter().enumerate().map(|(index, cell)| html! {
                            <CardView {index} cell={cell.clone()} callback={cb_flip.clone()}/>
                        })
                    }
                </div>
                <small id="gamepad-status" class={screen.controller.is_connected().then_some("connected")}>
                    {"Controller: "}{screen.controller.to_string()}
                </small>
                <GameOverView summary={screen.game_over.clone()} onplayagain={cb_play_again}/>
            </div>
        }
    }
}
