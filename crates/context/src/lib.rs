mod builder;
mod responder;

pub use builder::{
    build_context, district_apt_info, AptInfo, ComparisonContext, DistrictContext, ModeContext,
    OverviewContext, RankingContext,
};
pub use responder::{answer, compose_prompt, EchoResponder, Responder};
