//! Client execution logic: room races, solo tests and the leaderboard.

use std::{collections::HashSet, sync::Arc, time::Duration};

use typefast_shared::{
    api::{CreateRoomRequest, RoomDto, RoomMode},
    scoring::Difficulty,
    time::{Clock, SystemClock},
};

use crate::{
    api::{HttpApi, LeaderboardBridge, RoomDirectory},
    channel::WebSocketTransport,
    coordinator::{RoomCoordinator, RoomSession, Role},
    error::ClientError,
    formatter::MessageFormatter,
    race::{RaceStatus, RaceTyping},
    solo::{SoloPreferences, SoloStatus, SoloTest},
    ui::{keystrokes, print_above_prompt, redisplay_prompt, spawn_line_reader},
};

/// Race texts are drawn from the easy pool
const RACE_DIFFICULTY: Difficulty = Difficulty::Easy;

const ROOM_HELP: &str = "\
Commands:
  /start yes   start the race (host)
  /reset       reset the race (host)
  /rank        show the race ranking
  /who         show participants
  /say <text>  chat while racing
  /rejoin      reconnect after a lost connection
  /leave       leave the room
Anything else is chat, or your typing while a race runs.
";

/// Who this client is and where the server lives
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub server_url: String,
    pub user_id: String,
    pub username: String,
}

fn require_username(options: &ClientOptions) -> Result<(), ClientError> {
    if options.username.trim().is_empty() {
        return Err(ClientError::InvalidInput(
            "a username is required to race (--username)".to_string(),
        ));
    }
    Ok(())
}

/// Create a room and race in it as the host
pub async fn host_race(
    options: &ClientOptions,
    name: String,
    word_count: u32,
) -> Result<(), ClientError> {
    require_username(options)?;
    let api = HttpApi::new(&options.server_url);
    let room = api
        .create_room(CreateRoomRequest {
            name,
            host_id: options.user_id.clone(),
            mode: RoomMode::Words,
            word_count,
        })
        .await?;
    println!(
        "\nRoom '{}' created. Share the code {} with other racers.",
        room.name, room.code
    );
    run_room(options, &api, &room, Role::Host).await
}

/// Join a room by its code as a guest (or as the host if this user created it)
pub async fn join_race(options: &ClientOptions, code: &str) -> Result<(), ClientError> {
    require_username(options)?;
    let api = HttpApi::new(&options.server_url);
    let room = api.find_room_by_code(code).await?;
    let role = if room.host_id == options.user_id {
        Role::Host
    } else {
        Role::Guest
    };
    run_room(options, &api, &room, role).await
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Front-end controller owning the coordinator of one room
struct RoomController<'a> {
    options: &'a ClientOptions,
    leaderboard: &'a dyn LeaderboardBridge,
    coordinator: RoomCoordinator,
    clock: Arc<dyn Clock>,
    label: String,
    typing: Option<RaceTyping>,
    typing_text: Option<String>,
    submitted: bool,
    printed_messages: HashSet<String>,
    finished_count: usize,
}

async fn run_room(
    options: &ClientOptions,
    leaderboard: &dyn LeaderboardBridge,
    room: &RoomDto,
    role: Role,
) -> Result<(), ClientError> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let transport = Arc::new(WebSocketTransport::new(&options.server_url));
    let label = format!("{}@{}", options.username, room.code);
    let mut controller = RoomController {
        options,
        leaderboard,
        coordinator: RoomCoordinator::new(transport, clock.clone()),
        clock,
        label: label.clone(),
        typing: None,
        typing_text: None,
        submitted: false,
        printed_messages: HashSet::new(),
        finished_count: 0,
    };

    let joined = controller
        .coordinator
        .join_room(RoomSession::from(room), &options.username, role)
        .await;
    for notice in controller.coordinator.take_notices() {
        print!("{}", MessageFormatter::format_notice(&notice));
    }
    if !joined {
        return Err(ClientError::ConnectionError(format!(
            "could not join room {}",
            room.code
        )));
    }
    println!("\n{}", ROOM_HELP);

    let mut input_rx = spawn_line_reader(label);
    loop {
        tokio::select! {
            line = input_rx.recv() => {
                let Some(line) = line else { break };
                if controller.handle_line(&line).await == Flow::Quit {
                    break;
                }
            }
            _ = controller.coordinator.process_next_event(), if controller.coordinator.is_connected() => {}
        }
        controller.render().await;
    }

    controller.coordinator.leave_room();
    tracing::info!("Room session ended");
    Ok(())
}

impl RoomController<'_> {
    fn print(&self, text: &str) {
        print_above_prompt(text, &self.label);
    }

    async fn handle_line(&mut self, line: &str) -> Flow {
        let Some(command) = line.trim().strip_prefix('/') else {
            if self.typing.as_ref().is_some_and(|t| t.status() != RaceStatus::Finished) {
                self.type_line(line);
            } else if let Some(message) = self.coordinator.send_message(line) {
                self.printed_messages.insert(message.id);
                redisplay_prompt(&self.label);
            }
            return Flow::Continue;
        };

        let (name, rest) = command.split_once(' ').unwrap_or((command, ""));
        match name {
            "quit" | "exit" | "leave" => return Flow::Quit,
            "help" => self.print(ROOM_HELP),
            "start" => {
                if rest.trim() != "yes" {
                    self.print("Type '/start yes' to start the race for everyone\n");
                } else if !self.coordinator.start_race(true) {
                    self.print("Only the connected host can start the race\n");
                }
            }
            "reset" => {
                if !self.coordinator.reset_race() {
                    self.print("Only the connected host can reset the race\n");
                }
            }
            "rejoin" => {
                if self.coordinator.is_connected() {
                    self.print("Already connected\n");
                } else {
                    self.coordinator.rejoin().await;
                }
            }
            "rank" => self.print(&MessageFormatter::format_standings(
                &self.coordinator.standings(),
                self.coordinator.participant_id(),
            )),
            "who" => self.print(&MessageFormatter::format_participants(
                self.coordinator.participants(),
                self.coordinator.participant_id(),
            )),
            "say" => {
                if let Some(message) = self.coordinator.send_message(rest) {
                    self.printed_messages.insert(message.id);
                }
            }
            other => self.print(&format!("Unknown command '/{}'. Try /help\n", other)),
        }
        Flow::Continue
    }

    fn type_line(&mut self, line: &str) {
        let Some(typing) = self.typing.as_mut() else {
            return;
        };
        for value in keystrokes(line) {
            typing.input_to(&value, self.clock.now_millis(), &mut self.coordinator);
        }
        if typing.status() != RaceStatus::Finished
            && let Some(text) = self.typing_text.as_deref()
        {
            let view = MessageFormatter::format_race_text(text, typing.word_index());
            self.print(&format!("\n{}\n", view));
        }
    }

    /// Bring the terminal up to date with the coordinator
    async fn render(&mut self) {
        for notice in self.coordinator.take_notices() {
            self.print(&MessageFormatter::format_notice(&notice));
        }

        let new_messages: Vec<_> = self
            .coordinator
            .messages()
            .iter()
            .filter(|m| !self.printed_messages.contains(&m.id))
            .cloned()
            .collect();
        for message in new_messages {
            self.print(&MessageFormatter::format_chat_message(&message));
            self.printed_messages.insert(message.id);
        }

        self.sync_race();

        let standings = self.coordinator.standings();
        let finished = standings.iter().filter(|s| s.finished_at.is_some()).count();
        if finished != self.finished_count {
            self.finished_count = finished;
            if finished > 0 {
                self.print(&MessageFormatter::format_standings(
                    &standings,
                    self.coordinator.participant_id(),
                ));
            }
        }

        self.submit_if_finished().await;
    }

    fn sync_race(&mut self) {
        let race_text = self.coordinator.race().race_text().map(str::to_string);
        if race_text == self.typing_text {
            return;
        }
        self.typing = race_text.as_deref().map(RaceTyping::new);
        self.submitted = false;
        if let Some(text) = race_text.as_deref() {
            self.print(&format!(
                "\nRace! Type the words below (a line may hold several):\n\n{}\n",
                MessageFormatter::format_race_text(text, 0)
            ));
        }
        self.typing_text = race_text;
    }

    async fn submit_if_finished(&mut self) {
        let Some(typing) = self.typing.as_ref() else {
            return;
        };
        if typing.status() != RaceStatus::Finished || self.submitted {
            return;
        }
        self.submitted = true;
        let stats = typing.stats(self.clock.now_millis());
        self.print(&MessageFormatter::format_stats(&stats));

        match self
            .leaderboard
            .upsert_entry(
                &self.options.user_id,
                &self.options.username,
                stats.wpm,
                stats.accuracy,
                RACE_DIFFICULTY,
            )
            .await
        {
            Ok(entry) => self.print(&format!(
                "+{} points ({} total)\n",
                entry.earned_points.unwrap_or(0),
                entry.points
            )),
            Err(e) => tracing::warn!("Failed to submit race result: {}", e),
        }
    }
}

/// Run one solo test in the terminal
pub async fn run_solo(
    options: &ClientOptions,
    preferences: SoloPreferences,
    submit: bool,
) -> Result<(), ClientError> {
    let clock = SystemClock;
    let mut test = SoloTest::new(preferences, &mut rand::thread_rng());
    let label = "solo".to_string();

    println!(
        "\n{} s / {} words / {}. The timer starts with your first word.\n\n{}\n",
        preferences.time_secs,
        preferences.words,
        preferences.difficulty,
        MessageFormatter::format_race_text(&test.text(), 0)
    );

    let mut input_rx = spawn_line_reader(label.clone());
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    while test.status() != SoloStatus::Finished {
        tokio::select! {
            line = input_rx.recv() => {
                let Some(line) = line else { return Ok(()) };
                if line.trim() == "/quit" {
                    return Ok(());
                }
                for value in keystrokes(&line) {
                    test.input(&value, clock.now_millis());
                }
                if test.status() != SoloStatus::Finished {
                    let now = clock.now_millis();
                    print_above_prompt(
                        &format!(
                            "\n{}\n{} s left, {} wpm\n",
                            MessageFormatter::format_race_text(&test.text(), test.word_index()),
                            test.time_left_secs(now),
                            test.live_stats(now).wpm
                        ),
                        &label,
                    );
                }
            }
            _ = ticker.tick() => test.tick(clock.now_millis()),
        }
    }

    let Some(stats) = test.stats() else {
        return Ok(());
    };
    println!("\n\nTime!{}", MessageFormatter::format_stats(&stats));
    let history: Vec<String> = test.samples().iter().map(|s| s.wpm.to_string()).collect();
    println!("WPM history: {}", history.join(" "));

    if !submit {
        return Ok(());
    }
    let Some(result) = test.result(&options.user_id) else {
        return Ok(());
    };
    let api = HttpApi::new(&options.server_url);
    let entry = api
        .upsert_entry(
            &result.user_id,
            &options.username,
            result.wpm,
            result.accuracy,
            result.difficulty,
        )
        .await?;
    println!(
        "+{} points ({} total, best {} wpm)",
        entry.earned_points.unwrap_or(0),
        entry.points,
        entry.best_wpm
    );
    Ok(())
}

/// Print the top of the leaderboard
pub async fn show_leaderboard(server_url: &str, limit: usize) -> Result<(), ClientError> {
    let api = HttpApi::new(server_url);
    let entries = api.top_entries(limit).await?;
    print!("{}", MessageFormatter::format_leaderboard(&entries));

    let rooms = api.list_rooms().await?;
    if !rooms.is_empty() {
        println!("\nOpen rooms:");
        for room in &rooms {
            print!("{}", MessageFormatter::format_room(room));
        }
    }
    Ok(())
}
