use serde::{Deserialize, Serialize};

use crate::error::SessionError;

use super::location::{Area, UserProfile, Ward};

/// 本地持久化的会话状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: i64,
    pub user_name: String,
    #[serde(default)]
    pub user_phone: String,
    #[serde(default)]
    pub area_id: Option<i64>,
    #[serde(default)]
    pub area_name: Option<String>,
    #[serde(default)]
    pub ward_id: Option<i64>,
    #[serde(default)]
    pub ward_name: Option<String>,
}

impl Session {
    /// 登录成功后创建会话
    pub fn for_user(user: &UserProfile) -> Self {
        Self {
            user_id: user.id,
            user_name: user.name.clone(),
            user_phone: user.phone.clone(),
            area_id: None,
            area_name: None,
            ward_id: None,
            ward_name: None,
        }
    }

    /// 选择区域，同时清空之前选择的选区
    pub fn select_area(&mut self, area: &Area) {
        self.area_id = Some(area.id);
        self.area_name = Some(area.name.clone());
        self.clear_ward();
    }

    pub fn select_ward(&mut self, ward: &Ward) {
        self.ward_id = Some(ward.id);
        self.ward_name = Some(ward.name.clone());
    }

    pub fn clear_ward(&mut self) {
        self.ward_id = None;
        self.ward_name = None;
    }

    /// 回到区域选择，选区一并清空
    pub fn clear_area(&mut self) {
        self.area_id = None;
        self.area_name = None;
        self.clear_ward();
    }

    /// 生成答题流程所需的上下文
    pub fn flow_context(&self, survey_id: i64) -> Result<FlowContext, SessionError> {
        if self.user_id <= 0 {
            return Err(SessionError::NotLoggedIn);
        }
        let area_id = self.area_id.ok_or(SessionError::AreaNotSelected)?;
        let ward_id = self.ward_id.ok_or(SessionError::WardNotSelected)?;

        Ok(FlowContext {
            user_id: self.user_id,
            survey_id,
            area_id,
            ward_id,
        })
    }
}

/// 答题流程上下文，在流程开始时读取一次，流程中不再修改
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowContext {
    pub user_id: i64,
    pub survey_id: i64,
    pub area_id: i64,
    pub ward_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logged_in() -> Session {
        Session::for_user(&UserProfile {
            id: 42,
            name: "Field Worker".to_string(),
            phone: "9876543210".to_string(),
        })
    }

    #[test]
    fn test_flow_context_requires_area_and_ward() {
        let mut session = logged_in();
        assert_eq!(session.flow_context(1), Err(SessionError::AreaNotSelected));

        session.select_area(&Area { id: 3, name: "North".to_string() });
        assert_eq!(session.flow_context(1), Err(SessionError::WardNotSelected));

        session.select_ward(&Ward { id: 9, name: "Ward 9".to_string() });
        assert_eq!(
            session.flow_context(1),
            Ok(FlowContext {
                user_id: 42,
                survey_id: 1,
                area_id: 3,
                ward_id: 9
            })
        );
    }

    #[test]
    fn test_select_area_resets_ward() {
        let mut session = logged_in();
        session.select_area(&Area { id: 3, name: "North".to_string() });
        session.select_ward(&Ward { id: 9, name: "Ward 9".to_string() });

        session.select_area(&Area { id: 4, name: "South".to_string() });
        assert_eq!(session.ward_id, None);
        assert_eq!(session.area_name.as_deref(), Some("South"));
    }

    #[test]
    fn test_clear_area_returns_to_area_selection() {
        let mut session = logged_in();
        session.select_area(&Area { id: 3, name: "North".to_string() });
        session.select_ward(&Ward { id: 9, name: "Ward 9".to_string() });

        session.clear_area();
        assert_eq!(session.area_id, None);
        assert_eq!(session.ward_id, None);
        assert_eq!(session.user_id, 42);
        assert_eq!(session.flow_context(1), Err(SessionError::AreaNotSelected));
    }
}
