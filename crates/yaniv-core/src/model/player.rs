use crate::ai::{AgentParams, AutonomousAgent};
use crate::game::action::Action;
use crate::model::hand::Hand;

/// Who makes decisions for a seat.
#[derive(Debug)]
pub enum Controller {
    /// Actions arrive from outside the engine.
    Human,
    Autonomous(Box<AutonomousAgent>),
}

#[derive(Debug)]
pub struct Player {
    name: String,
    hand: Hand,
    score: u32,
    controller: Controller,
}

impl Player {
    pub fn human(name: impl Into<String>) -> Self {
        Self::with_controller(name, Controller::Human)
    }

    pub fn autonomous(name: impl Into<String>, params: AgentParams) -> Self {
        let name = name.into();
        let agent = AutonomousAgent::new(name.clone(), params);
        Self::with_controller(name, Controller::Autonomous(Box::new(agent)))
    }

    pub fn with_controller(name: impl Into<String>, controller: Controller) -> Self {
        Self {
            name: name.into(),
            hand: Hand::new(),
            score: 0,
            controller,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn hand(&self) -> &Hand {
        &self.hand
    }

    pub(crate) fn hand_mut(&mut self) -> &mut Hand {
        &mut self.hand
    }

    pub fn hand_value(&self) -> u32 {
        self.hand.value()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub(crate) fn set_score(&mut self, score: u32) {
        self.score = score;
    }

    pub fn is_autonomous(&self) -> bool {
        matches!(self.controller, Controller::Autonomous(_))
    }

    pub fn agent(&self) -> Option<&AutonomousAgent> {
        match &self.controller {
            Controller::Autonomous(agent) => Some(agent),
            Controller::Human => None,
        }
    }

    pub fn agent_mut(&mut self) -> Option<&mut AutonomousAgent> {
        match &mut self.controller {
            Controller::Autonomous(agent) => Some(agent),
            Controller::Human => None,
        }
    }

    /// Asks the agent for this turn's action. `None` for human seats.
    pub fn decide_action(&mut self) -> Option<Action> {
        match &mut self.controller {
            Controller::Autonomous(agent) => agent.decide_action(self.hand.cards(), self.score),
            Controller::Human => None,
        }
    }

    /// Asks the agent whether to call Yaniv. `None` for human seats.
    pub fn should_declare_yaniv(&mut self) -> Option<bool> {
        match &mut self.controller {
            Controller::Autonomous(agent) => {
                Some(agent.should_declare_yaniv(self.hand.cards(), self.score))
            }
            Controller::Human => None,
        }
    }
}
