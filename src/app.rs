use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{error, info, warn};

use crate::clients::{ApiTransport, HttpApiClient};
use crate::config::Config;
use crate::error::{AppError, FlowError, SubmitError};
use crate::models::{FlowContext, Session};
use crate::presenter::{self, MenuChoice};
use crate::services::{AccountService, CatalogLoader, SessionStore};
use crate::utils::logging;
use crate::workflow::{FlowState, SurveyFlow};

type Input = Lines<BufReader<Stdin>>;

/// 一次答题的结局
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SurveyOutcome {
    Completed,
    Aborted,
}

/// 选区选择的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WardStep {
    Selected,
    ChangeArea,
    Quit,
}

/// 应用主结构
pub struct App {
    config: Config,
    api: Arc<dyn ApiTransport>,
    accounts: AccountService,
    loader: CatalogLoader,
    store: SessionStore,
}

impl App {
    /// 初始化应用
    pub fn initialize(config: Config) -> Result<Self> {
        config.validate()?;
        logging::log_startup(&config);

        let api: Arc<dyn ApiTransport> = Arc::new(HttpApiClient::new(&config)?);

        Ok(Self {
            accounts: AccountService::new(api.clone()),
            loader: CatalogLoader::new(api.clone()),
            store: SessionStore::new(&config.session_file),
            api,
            config,
        })
    }

    /// 运行应用主逻辑：登录 → 选区域 → 选选区 → 答题，循环直到用户退出
    pub async fn run(&self) -> Result<()> {
        let mut input = BufReader::new(tokio::io::stdin()).lines();

        let mut session = match self.store.load().await? {
            Some(session) => {
                info!("✓ 已恢复会话: {}", session.user_name);
                session
            }
            None => match self.login(&mut input).await? {
                Some(session) => session,
                None => return Ok(()),
            },
        };

        loop {
            if session.area_id.is_none() && !self.select_area(&mut session, &mut input).await? {
                break;
            }
            if session.ward_id.is_none() {
                match self.select_ward(&mut session, &mut input).await? {
                    WardStep::Selected => {}
                    WardStep::ChangeArea => {
                        session.clear_area();
                        self.store.save(&session).await?;
                        continue;
                    }
                    WardStep::Quit => break,
                }
            }
            self.store.save(&session).await?;

            let context = session.flow_context(self.config.survey_id)?;
            let ward_name = session.ward_name.clone().unwrap_or_default();
            let outcome = self.run_survey(context, &ward_name, &mut input).await?;

            // 与移动端一致：提交或放弃后都回到选区选择
            session.clear_ward();
            self.store.save(&session).await?;

            if outcome == SurveyOutcome::Aborted {
                println!("已退出答题，返回选区选择");
                continue;
            }

            let again = prompt(&mut input, "继续采集下一户？(y/n，l 退出登录)").await?;
            match again.as_deref().map(str::trim) {
                Some("y" | "Y") => {}
                Some("l" | "L") => {
                    self.store.clear().await?;
                    info!("✓ 已退出登录: {}", session.user_name);
                    break;
                }
                _ => break,
            }
        }

        info!("👋 程序结束");
        Ok(())
    }

    /// 登录并创建会话，输入结束时返回 `None`
    async fn login(&self, input: &mut Input) -> Result<Option<Session>> {
        loop {
            let Some(phone) = prompt(input, "手机号:").await? else {
                return Ok(None);
            };
            let Some(password) = prompt(input, "密码:").await? else {
                return Ok(None);
            };

            match self.accounts.login(&phone, &password).await {
                Ok(user) => {
                    let session = Session::for_user(&user);
                    self.store.save(&session).await?;
                    println!("欢迎，{}", user.name);
                    return Ok(Some(session));
                }
                Err(e) => {
                    warn!("登录失败: {}", e);
                    println!("{}", e);
                }
            }
        }
    }

    /// 选择区域，返回 `false` 表示用户放弃
    async fn select_area(&self, session: &mut Session, input: &mut Input) -> Result<bool> {
        let areas = match self.accounts.areas().await {
            Ok(areas) => areas,
            Err(e) => {
                self.report_error(e);
                return Ok(false);
            }
        };
        if areas.is_empty() {
            println!("没有可选的区域");
            return Ok(false);
        }

        println!("\n请选择区域:");
        for (i, area) in areas.iter().enumerate() {
            println!("  {}. {}", i + 1, area.name);
        }

        loop {
            let Some(line) = prompt(input, "区域编号 (q 退出):").await? else {
                return Ok(false);
            };
            match presenter::menu_choice(&areas, &line) {
                MenuChoice::Pick(area) => {
                    session.select_area(area);
                    info!("✓ 已选择区域: {}", area.name);
                    return Ok(true);
                }
                MenuChoice::Quit => return Ok(false),
                MenuChoice::Back | MenuChoice::Invalid => println!("编号无效"),
            }
        }
    }

    /// 选择选区，`b` 返回区域选择
    async fn select_ward(&self, session: &mut Session, input: &mut Input) -> Result<WardStep> {
        let Some(area_id) = session.area_id else {
            return Ok(WardStep::ChangeArea);
        };
        let wards = match self.accounts.wards(area_id).await {
            Ok(wards) => wards,
            Err(e) => {
                self.report_error(e);
                return Ok(WardStep::Quit);
            }
        };
        if wards.is_empty() {
            println!("该区域下没有选区，请重新选择区域");
            return Ok(WardStep::ChangeArea);
        }

        println!(
            "\n{} - 请选择选区:",
            session.area_name.as_deref().unwrap_or("")
        );
        for (i, ward) in wards.iter().enumerate() {
            println!("  {}. {}", i + 1, ward.name);
        }

        loop {
            let Some(line) = prompt(input, "选区编号 (b 更换区域, q 退出):").await? else {
                return Ok(WardStep::Quit);
            };
            match presenter::menu_choice(&wards, &line) {
                MenuChoice::Pick(ward) => {
                    session.select_ward(ward);
                    info!("✓ 已选择选区: {}", ward.name);
                    return Ok(WardStep::Selected);
                }
                MenuChoice::Back => return Ok(WardStep::ChangeArea),
                MenuChoice::Quit => return Ok(WardStep::Quit),
                MenuChoice::Invalid => println!("编号无效"),
            }
        }
    }

    /// 加载题目并逐题作答
    async fn run_survey(
        &self,
        context: FlowContext,
        ward_name: &str,
        input: &mut Input,
    ) -> Result<SurveyOutcome> {
        let catalog = loop {
            match self.loader.load(context.survey_id).await {
                Ok(catalog) => break catalog,
                Err(e) => {
                    println!("{}", e);
                    let retry = prompt(input, "重试？(y/n)").await?;
                    if !presenter::is_yes(retry.as_deref()) {
                        return Ok(SurveyOutcome::Aborted);
                    }
                }
            }
        };

        let mut flow = match SurveyFlow::new(catalog, context) {
            Ok(flow) => flow,
            Err(FlowError::NoQuestions) => {
                println!("{}", FlowError::NoQuestions);
                return Ok(SurveyOutcome::Aborted);
            }
        };

        while let (Some(question), Some(progress), Some(hint)) =
            (flow.current_question(), flow.progress(), flow.input_hint())
        {
            print!(
                "{}",
                presenter::render_question(question, progress, hint, flow.current_answer())
            );
            let action = if flow.is_last() { "提交" } else { "下一题" };

            let Some(line) = prompt(input, &format!("[{}] (q 退出):", action)).await? else {
                flow.abort();
                break;
            };
            if is_quit(&line) {
                let confirm = prompt(input, "退出答题？已作答内容将丢失 (y/n)").await?;
                if presenter::is_yes(confirm.as_deref()) {
                    flow.abort();
                    break;
                }
                continue;
            }

            let raw = presenter::parse_line(question, &line, hint);
            if !flow.is_last() {
                if let Err(e) = flow.advance(&raw) {
                    println!("{}", e);
                }
                continue;
            }

            match flow.submit(&raw, self.api.as_ref()).await {
                Ok(payload) => {
                    println!("\n问卷已提交，谢谢！");
                    logging::log_survey_complete(ward_name, payload.answers.len());
                }
                Err(SubmitError::Validation(e)) => println!("{}", e),
                Err(e) => {
                    error!("提交失败: {}", e);
                    println!("{}（可再次提交）", e);
                }
            }
        }

        Ok(match flow.state() {
            FlowState::Completed => SurveyOutcome::Completed,
            _ => SurveyOutcome::Aborted,
        })
    }

    /// 打印请求错误
    fn report_error(&self, err: AppError) {
        error!("请求失败: {}", err);
        if err.is_retryable() {
            println!("{}，请稍后重新运行", err);
        } else {
            println!("{}", err);
        }
    }
}

/// 打印提示并读取一行，输入结束时返回 `None`
async fn prompt(input: &mut Input, text: &str) -> Result<Option<String>> {
    println!("{}", text);
    Ok(input.next_line().await?)
}

fn is_quit(line: &str) -> bool {
    matches!(line.trim(), "q" | "Q")
}
