use aws_sdk_s3::primitives::ByteStream;
use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::models::plan::LearningPlan;

#[derive(Debug, Clone, Serialize)]
pub struct PlanExport {
    pub plan_id: uuid::Uuid,
    pub version: i32,
    pub s3_key: String,
    pub bytes: usize,
}

/// Object key for a plan export. One object per stored version.
pub fn export_key(plan: &LearningPlan) -> String {
    format!("plans/{}/{}/v{}.md", plan.user_id, plan.id, plan.version)
}

/// Renders a plan as a markdown document.
pub fn render_plan_markdown(plan: &LearningPlan) -> String {
    let mut md = String::new();

    let title = plan
        .overview
        .as_ref()
        .map(|o| o.overview.title.clone())
        .unwrap_or_else(|| "Learning Plan".to_string());
    md.push_str(&format!("# {title}\n\n"));
    md.push_str(&format!(
        "- **Duration:** {} weeks ({})\n",
        plan.duration_weeks, plan.intensity
    ));
    md.push_str(&format!(
        "- **Weekly target:** {}-{} hours\n",
        plan.weekly_hours_target.min, plan.weekly_hours_target.max
    ));
    md.push_str(&format!(
        "- **Content:** {} videos, {} hours\n",
        plan.total_videos, plan.total_hours
    ));
    md.push_str(&format!("- **Difficulty:** {}/10\n", plan.content_difficulty));
    md.push_str(&format!(
        "- **Status:** {} ({}% complete)\n",
        plan.status.as_str(),
        plan.progress
    ));
    if !plan.required_skills.is_empty() {
        md.push_str(&format!("- **Skills:** {}\n", plan.required_skills.join(", ")));
    }
    md.push('\n');

    if let Some(overview) = &plan.overview {
        if let Some(description) = &overview.overview.description {
            md.push_str(&format!("{description}\n\n"));
        }
        md.push_str(&format!("**Strategy:** {}\n\n", overview.skill_gaps.strategy));
    }

    for slot in &plan.weekly_schedule {
        md.push_str(&format!(
            "## Week {}: {} (~{}h)\n\n",
            slot.week, slot.focus, slot.estimated_hours
        ));
        for video in &slot.videos {
            let done = if plan.completed_video_ids.contains(&video.id) {
                "x"
            } else {
                " "
            };
            let link = video
                .url
                .as_ref()
                .map(|u| format!("[{}]({u})", video.title))
                .unwrap_or_else(|| video.title.clone());
            md.push_str(&format!(
                "- [{done}] {link} ({}, {} min)\n",
                video.channel, video.estimated_completion_time
            ));
        }
        if !slot.milestones.is_empty() {
            md.push_str("\n**Milestones**\n\n");
            for milestone in &slot.milestones {
                md.push_str(&format!("- {milestone}\n"));
            }
        }
        if !slot.completion_criteria.is_empty() {
            md.push_str("\n**Done when**\n\n");
            for criterion in &slot.completion_criteria {
                md.push_str(&format!("- {criterion}\n"));
            }
        }
        md.push('\n');
    }

    if !plan.customizations.is_empty() {
        md.push_str("## Customizations\n\n");
        for c in &plan.customizations {
            md.push_str(&format!(
                "- {}: {} ({})\n",
                c.skill_id, c.new_content.title, c.reason
            ));
        }
        md.push('\n');
    }

    md
}

/// Uploads the markdown rendering of `plan` to object storage.
pub async fn export_plan(
    s3: &aws_sdk_s3::Client,
    bucket: &str,
    plan: &LearningPlan,
) -> Result<PlanExport, AppError> {
    let markdown = render_plan_markdown(plan);
    let bytes = markdown.len();
    let s3_key = export_key(plan);

    s3.put_object()
        .bucket(bucket)
        .key(&s3_key)
        .body(ByteStream::from(markdown.into_bytes()))
        .content_type("text/markdown")
        .send()
        .await
        .map_err(|e| AppError::Storage(format!("S3 upload failed: {e}")))?;

    info!("Exported plan {} to s3://{}/{}", plan.id, bucket, s3_key);

    Ok(PlanExport {
        plan_id: plan.id,
        version: plan.version,
        s3_key,
        bytes,
    })
}
