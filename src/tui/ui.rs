use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};
use ratatui::style::{Color, Style};
use ratatui::text::Span;

use crate::tui::TuiState;
use crate::tui::component::Component;
use crate::tui::components::{ScreenView, TitleBar};

const HELP_TEXT: &str = "Tab/Shift+Tab: focus | Enter: press | Esc: quit";

/// Props for one frame, gathered from the flow before drawing.
pub struct FrameProps {
    pub current: Option<String>,
    pub next: Option<String>,
    pub status_message: String,
}

pub fn draw_ui(frame: &mut Frame, props: FrameProps, tui: &mut TuiState) {
    use Constraint::{Length, Min};
    let layout = Layout::vertical([Length(1), Min(0), Length(1)]);
    let [title_area, main_area, help_area] = layout.areas(frame.area());

    let pending = props.next.filter(|next| Some(next) != props.current.as_ref());
    TitleBar::new(props.current, props.status_message, pending).render(frame, title_area);

    ScreenView::new(&tui.screen).render(frame, main_area);

    frame.render_widget(
        Span::styled(HELP_TEXT, Style::default().fg(Color::DarkGray)),
        help_area,
    );
}
